//! # Tusk 🐘
//!
//! Open what a Mastodon post points at, from the terminal.
//!
//! ## Overview
//!
//! Tusk turns the HTML of a status into plain text plus a list of links,
//! routes each link to the program configured for it, hands downloaded
//! attachments to the right viewer, and prints timestamps the way the user
//! asked for. Programs that need the terminal take it over from the pager
//! and give it back when they exit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │   Pager for one post, turns keys into launch requests       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Content     │ │     Router      │ │    Dispatch     │
//! │                 │ │                 │ │                 │
//! │ • Sanitize HTML │ │ • Glob rules    │ │ • Media kinds   │
//! │ • Harvest links │ │ • Custom opener │ │ • Single/batch  │
//! │ • Plain text    │ │ • Default       │ │ • Reverse order │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Launch      │ │      Date       │ │     Config      │
//! │                 │ │                 │ │                 │
//! │ • Background    │ │ • Same day      │ │ • TOML          │
//! │ • Foreground    │ │ • Relative      │ │ • !CMD! values  │
//! │ • Suspend UI    │ │ • Long format   │ │ • Validation    │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Pager state and event loop
//! - [`config`]: Configuration management
//! - [`content`]: HTML to text and links
//! - [`date`]: Timestamp rendering
//! - [`dispatch`]: Attachment viewers
//! - [`download`]: Fetching attachments to temp files
//! - [`editor`]: Drafting in `$EDITOR`
//! - [`launch`]: Starting external programs
//! - [`models`]: Post and link models
//! - [`router`]: URL to program routing
//!
//! ## Example
//!
//! ```no_run
//! use tusk::launch::{self, NoTui, ProcessRunner};
//! use tusk::{Config, Router};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let router = Router::from_config(&config)?;
//!     let request = router.route("https://example.com/a.png");
//!     launch::execute(&mut ProcessRunner::new(&mut NoTui), &[request])?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/tusk/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::similar_names)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]

pub mod app;
pub mod config;
pub mod content;
pub mod date;
pub mod dispatch;
pub mod download;
pub mod editor;
pub mod error;
pub mod launch;
pub mod models;
pub mod paths;
pub mod router;

// Re-export main types for convenience
pub use app::AppState;
pub use config::Config;
pub use content::{Rendered, extract};
pub use date::DateRenderPolicy;
pub use dispatch::MediaKind;
pub use error::{Error, Result};
pub use launch::{LaunchMode, LaunchRequest, Launcher, ProcessRunner, Suspend};
pub use models::{Link, MediaAttachment, MediaType, Post};
pub use router::{Router, RoutingRule};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
