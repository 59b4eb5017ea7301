//! Strongly-typed identifiers for server-side records.
//!
//! The API hands out numeric primary keys; wrapping them keeps an announcement
//! id from being passed where a question id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Identifier of a user record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of an announcement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncementId(i64);

/// Identifier of a question.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(i64);

/// Identifier of an announcement or question category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

/// Identifier of a carousel slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarouselId(i64);

/// Identifier of an uploaded attachment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(i64);

macro_rules! impl_numeric_id {
    ($t:ty) => {
        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

impl_numeric_id!(UserId);
impl_numeric_id!(AnnouncementId);
impl_numeric_id!(QuestionId);
impl_numeric_id!(CategoryId);
impl_numeric_id!(CarouselId);
impl_numeric_id!(AttachmentId);
