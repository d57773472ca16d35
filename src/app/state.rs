//! Application state

use chrono::{DateTime, Local};

use crate::config::Config;
use crate::content::Rendered;
use crate::date;
use crate::models::{Link, Post};
use crate::router::Router;

/// Current input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Waiting for the digit of a custom opener
    PickOpener,
    Help,
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Compiled URL rules
    pub router: Router,
    /// The post being shown
    pub post: Post,
    /// Text and links of the post body
    pub rendered: Rendered,
    /// Whether to quit
    pub should_quit: bool,
    /// Input mode
    pub mode: Mode,
    /// Selected link index
    pub selected_link: usize,
    /// Scroll offset of the body
    pub scroll: u16,
    /// Last reply drafted in the editor
    pub draft: Option<String>,
    /// Status message (bottom bar)
    pub status: String,
}

impl AppState {
    /// Create a new app state
    pub fn new(config: Config, router: Router, post: Post) -> Self {
        let rendered = post.rendered();
        Self {
            config,
            router,
            post,
            rendered,
            should_quit: false,
            mode: Mode::Normal,
            selected_link: 0,
            scroll: 0,
            draft: None,
            status: String::new(),
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Get the currently selected link
    pub fn selected_link(&self) -> Option<&Link> {
        self.rendered.links.get(self.selected_link)
    }

    /// Move link selection down
    pub fn select_next_link(&mut self) {
        if !self.rendered.links.is_empty() {
            self.selected_link = (self.selected_link + 1).min(self.rendered.links.len() - 1);
        }
    }

    /// Move link selection up
    pub fn select_prev_link(&mut self) {
        self.selected_link = self.selected_link.saturating_sub(1);
    }

    /// Post date as configured, relative to `now`
    pub fn post_date(&self, now: &DateTime<Local>) -> String {
        let created = self.post.created_at.with_timezone(&Local);
        date::format(&created, now, &self.config.general.date_policy())
    }
}
