/// Static per-route metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub name: &'static str,
    pub title: &'static str,
    /// Listed in the tab bar.
    pub show_in_nav: bool,
    /// Full-screen views hide the tab bar.
    pub hide_nav: bool,
    /// Selection and scroll position survive navigating away.
    pub keep_alive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    NewDiary,
    DiaryDetail { id: String },
    EditDiary { id: String },
    Insights,
    Settings,
}

const HOME: RouteMeta = RouteMeta {
    name: "home",
    title: "Diary",
    show_in_nav: true,
    hide_nav: false,
    keep_alive: true,
};
const NEW_DIARY: RouteMeta = RouteMeta {
    name: "newDiary",
    title: "New Entry",
    show_in_nav: false,
    hide_nav: true,
    keep_alive: false,
};
const DIARY_DETAIL: RouteMeta = RouteMeta {
    name: "diaryDetail",
    title: "Entry",
    show_in_nav: false,
    hide_nav: false,
    keep_alive: false,
};
const EDIT_DIARY: RouteMeta = RouteMeta {
    name: "editDiary",
    title: "Edit Entry",
    show_in_nav: false,
    hide_nav: true,
    keep_alive: false,
};
const INSIGHTS: RouteMeta = RouteMeta {
    name: "insights",
    title: "Insights",
    show_in_nav: true,
    hide_nav: false,
    keep_alive: false,
};
const SETTINGS: RouteMeta = RouteMeta {
    name: "settings",
    title: "Settings",
    show_in_nav: true,
    hide_nav: false,
    keep_alive: false,
};

/// Routes shown in the tab bar, in display order.
pub const NAV_ROUTES: [Route; 3] = [Route::Home, Route::Insights, Route::Settings];

impl Route {
    pub fn meta(&self) -> RouteMeta {
        match self {
            Route::Home => HOME,
            Route::NewDiary => NEW_DIARY,
            Route::DiaryDetail { .. } => DIARY_DETAIL,
            Route::EditDiary { .. } => EDIT_DIARY,
            Route::Insights => INSIGHTS,
            Route::Settings => SETTINGS,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::NewDiary => "/new".to_string(),
            Route::DiaryDetail { id } => format!("/diary/{id}"),
            Route::EditDiary { id } => format!("/diary/{id}/edit"),
            Route::Insights => "/insights".to_string(),
            Route::Settings => "/settings".to_string(),
        }
    }
}

/// Maps a path (with or without a leading `#`) to a route; unknown paths
/// redirect to [`Route::Home`].
pub fn resolve(path: &str) -> Route {
    let path = path.trim_start_matches('#');
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => Route::Home,
        ["new"] => Route::NewDiary,
        ["diary", id] => Route::DiaryDetail { id: id.to_string() },
        ["diary", id, "edit"] => Route::EditDiary { id: id.to_string() },
        ["insights"] => Route::Insights,
        ["settings"] => Route::Settings,
        _ => Route::Home,
    }
}
