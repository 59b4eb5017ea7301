//! Static route table.

use std::collections::BTreeMap;

use appealwall_auth::{AuthRequirement, Role};

pub const LOGIN_PATH: &str = "/login";
pub const NOT_FOUND_PATH: &str = "/not-found";

/// Page component a route renders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum View {
    About,
    AdminIndex,
    AdminList,
    AdminServerStatus,
    AdminCategories,
    AdminCarousels,
    AnnouncementList,
    AnnouncementCreate,
    AnnouncementShow,
    QuestionList,
    QuestionCreate,
    Login,
    UserIndex,
    NotFound,
}

/// One entry of the route table.
///
/// `pattern` segments are literals, `:name` parameters, or a lone `*` that
/// matches anything (the not-found fallback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub pattern: String,
    pub view: Option<View>,
    /// Title template, may contain the tenant placeholder.
    pub title: Option<String>,
    pub auth: AuthRequirement,
    /// Static redirect; such routes render nothing.
    pub redirect: Option<String>,
}

impl RouteDescriptor {
    pub fn new(pattern: impl Into<String>, view: View) -> Self {
        Self {
            pattern: pattern.into(),
            view: Some(view),
            title: None,
            auth: AuthRequirement::None,
            redirect: None,
        }
    }

    pub fn redirect(pattern: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            view: None,
            title: None,
            auth: AuthRequirement::None,
            redirect: Some(to.into()),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn requires(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }

    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        if self.pattern == "*" {
            return Some(BTreeMap::new());
        }

        let pattern: Vec<&str> = segments(&self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (p, a) in pattern.iter().zip(actual.iter()) {
            match p.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), (*a).to_string());
                }
                None if p == a => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Split a full path (`/a/b?x=1#top`) into its path part.
pub fn path_of(full_path: &str) -> &str {
    let end = full_path.find(['?', '#']).unwrap_or(full_path.len());
    &full_path[..end]
}

/// A route resolved for a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: RouteDescriptor,
    /// Path including query and fragment, as the user requested it.
    pub full_path: String,
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered route table; the first matching entry wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn resolve(&self, full_path: &str) -> Option<RouteMatch> {
        let path = path_of(full_path);
        self.routes.iter().find_map(|route| {
            route.matches(path).map(|params| RouteMatch {
                route: route.clone(),
                full_path: full_path.to_string(),
                path: path.to_string(),
                params,
            })
        })
    }

    /// The appeal wall's routes.
    pub fn appeal_wall() -> Self {
        let admin = || AuthRequirement::Role(Role::ADMIN);

        Self::new(vec![
            RouteDescriptor::redirect("/", "/announcements"),
            RouteDescriptor::new("/about", View::About).titled("关于"),
            RouteDescriptor::new("/admin", View::AdminIndex)
                .titled("管理员菜单")
                .requires(admin()),
            RouteDescriptor::new("/admin/admins", View::AdminList)
                .titled("管理员列表")
                .requires(admin()),
            RouteDescriptor::new("/admin/server-status", View::AdminServerStatus)
                .titled("服务器状态")
                .requires(admin()),
            RouteDescriptor::new("/admin/categories", View::AdminCategories)
                .titled("分类管理")
                .requires(admin()),
            RouteDescriptor::new("/admin/carousels", View::AdminCarousels)
                .titled("轮播图管理")
                .requires(admin()),
            RouteDescriptor::new("/announcements", View::AnnouncementList).titled("{tenant}"),
            RouteDescriptor::new("/announcements/create", View::AnnouncementCreate)
                .titled("发布公告")
                .requires(admin()),
            RouteDescriptor::new("/announcements/:id", View::AnnouncementShow).titled("公告详情"),
            RouteDescriptor::new("/questions", View::QuestionList).titled("{tenant}问答"),
            RouteDescriptor::new("/questions/create", View::QuestionCreate)
                .titled("提问")
                .requires(AuthRequirement::AnyUser),
            RouteDescriptor::new(LOGIN_PATH, View::Login).titled("登录"),
            RouteDescriptor::new("/user", View::UserIndex)
                .titled("个人中心")
                .requires(AuthRequirement::AnyUser),
            RouteDescriptor::new(NOT_FOUND_PATH, View::NotFound).titled("页面不存在"),
            RouteDescriptor::new("*", View::NotFound).titled("页面不存在"),
        ])
    }
}
