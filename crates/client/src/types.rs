//! Wire types returned by the appeal-wall API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use appealwall_auth::User;
use appealwall_core::{AnnouncementId, AttachmentId, CarouselId, CategoryId, QuestionId};
use appealwall_pagination::Identified;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl Attachment {
    /// Download location of the attachment under the API base URL.
    pub fn url(&self, api_base: &str) -> String {
        format!("{}/attachments/{}", api_base.trim_end_matches('/'), self.id)
    }

    pub fn display_size(&self) -> String {
        format_size(self.size)
    }
}

/// Binary (1024-based) size with one decimal, JEDEC unit names.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for u in UNITS {
        // Compare after rounding so 1023.96 KB reads "1 MB", not "1024 KB".
        if (value * 10.0).round() / 10.0 < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = u;
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0} {unit}")
    } else {
        format!("{rounded:.1} {unit}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub user: User,
    #[serde(default)]
    pub category: Option<AnnouncementCategory>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Announcement {
    type Key = AnnouncementId;

    fn identity(&self) -> AnnouncementId {
        self.id
    }
}

/// A carousel slot on the announcement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementCarousel {
    pub id: CarouselId,
    pub announcement: Announcement,
    #[serde(default)]
    pub cover: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub user: User,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub likes_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    /// Absent for anonymous submissions.
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub category: Option<QuestionCategory>,
    #[serde(default)]
    pub contact: String,
    /// Campus code, see [`Campus::from_code`].
    #[serde(default)]
    pub campus: String,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub answer: Option<Answer>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    pub fn campus_name(&self) -> &'static str {
        Campus::display_name_of(&self.campus)
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

impl Identified for Question {
    type Key = QuestionId;

    fn identity(&self) -> QuestionId {
        self.id
    }
}

/// Body of a question submission. Anonymous submitters get a resource token back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub contact: String,
    pub campus: Campus,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Campus {
    Main,
    Tongzhou,
    Zhonglan,
}

impl Campus {
    pub const ALL: [Campus; 3] = [Campus::Main, Campus::Tongzhou, Campus::Zhonglan];

    pub fn code(&self) -> &'static str {
        match self {
            Campus::Main => "MAIN",
            Campus::Tongzhou => "TONGZHOU",
            Campus::Zhonglan => "ZHONGLAN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Campus::Main => "平乐园校区",
            Campus::Tongzhou => "通州校区",
            Campus::Zhonglan => "中蓝校区",
        }
    }

    pub fn from_code(code: &str) -> Option<Campus> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Display name for a raw code; unknown codes display as empty.
    pub fn display_name_of(code: &str) -> &'static str {
        Self::from_code(code).map_or("", |c| c.display_name())
    }
}
