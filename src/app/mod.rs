//! TUI for reading a single post
//!
//! The pager owns the terminal. Whenever a program has to run in the
//! terminal (a console browser, a terminal image viewer, the editor) the
//! pager leaves the alternate screen, lets the program run, and redraws when
//! it exits. That hand-over is the [`Suspend`] implementation on [`Tui`].

mod events;
mod state;
mod ui;

pub use events::Action;
pub use state::AppState;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::{Stdout, stdout};
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::dispatch;
use crate::download;
use crate::editor;
use crate::error::Error;
use crate::launch::{self, ProcessRunner, Suspend};
use crate::models::Post;
use crate::router::Router;

/// The terminal while the pager owns it
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Enter raw mode and the alternate screen
    pub fn enter() -> std::io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    /// Give the terminal back for good
    pub fn exit(mut self) -> std::io::Result<()> {
        self.release()
    }

    fn release(&mut self) -> std::io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }

    fn reclaim(&mut self) -> std::io::Result<()> {
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        // Whatever the child drew is gone, force a full redraw
        self.terminal.clear()
    }

    fn draw(&mut self, state: &AppState) -> std::io::Result<()> {
        self.terminal.draw(|frame| ui::render(frame, state))?;
        Ok(())
    }
}

impl Suspend for Tui {
    fn suspend<R>(&mut self, f: impl FnOnce() -> R) -> crate::error::Result<R> {
        hand_over(self, Self::release, Self::reclaim, f)
    }
}

/// Release the terminal, run `f`, reclaim the terminal.
///
/// A release that fails partway is undone with `reclaim` before the error is
/// returned, and `f` is not run.
fn hand_over<T, R>(
    term: &mut T,
    release: fn(&mut T) -> std::io::Result<()>,
    reclaim: fn(&mut T) -> std::io::Result<()>,
    f: impl FnOnce() -> R,
) -> crate::error::Result<R> {
    if let Err(e) = release(term) {
        if let Err(again) = reclaim(term) {
            tracing::warn!("Could not restore terminal: {again}");
        }
        return Err(Error::Terminal(e));
    }
    let result = f();
    reclaim(term).map_err(Error::Terminal)?;
    Ok(result)
}

/// Show `post` until the user quits
pub fn run(config: Config, post: Post) -> Result<()> {
    let rt = Runtime::new()?;
    let router = Router::from_config(&config)?;
    let mut state = AppState::new(config, router, post);

    let mut tui = Tui::enter().context("Failed to set up terminal")?;
    let result = run_app(&mut tui, &mut state, &rt);
    tui.exit().context("Failed to restore terminal")?;

    result
}

fn run_app(tui: &mut Tui, state: &mut AppState, rt: &Runtime) -> Result<()> {
    loop {
        tui.draw(state)?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = events::handle_key(state, key)
        {
            perform(tui, state, rt, action);
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

/// Run an action. Failures end up in the status bar, never abort the pager.
fn perform(tui: &mut Tui, state: &mut AppState, rt: &Runtime, action: Action) {
    let result = match action {
        Action::OpenLink(index) => open_link(tui, state, index),
        Action::OpenCustom(opener) => open_custom(tui, state, opener),
        Action::OpenMedia => open_media(tui, state, rt),
        Action::Compose => compose(tui, state),
    };
    if let Err(e) = result {
        if e.is_launch_failure() {
            tracing::info!("{e}");
        } else {
            tracing::warn!("{e}");
        }
        state.set_status(format!("❌ {e}"));
    }
}

fn open_link(tui: &mut Tui, state: &mut AppState, index: usize) -> crate::error::Result<()> {
    let Some(link) = state.rendered.links.get(index) else {
        return Ok(());
    };
    let request = state.router.route(&link.url);
    let message = format!("Opened {} in {}", link.url, request.program);
    launch::execute(&mut ProcessRunner::new(tui), &[request])?;
    state.set_status(message);
    Ok(())
}

fn open_custom(tui: &mut Tui, state: &mut AppState, opener: usize) -> crate::error::Result<()> {
    let Some(link) = state.selected_link() else {
        return Ok(());
    };
    let Some(request) = state.router.open_custom(opener, &link.url) else {
        return Ok(());
    };
    let message = format!("Opened {} in {}", link.url, request.program);
    launch::execute(&mut ProcessRunner::new(tui), &[request])?;
    state.set_status(message);
    Ok(())
}

fn open_media(tui: &mut Tui, state: &mut AppState, rt: &Runtime) -> crate::error::Result<()> {
    let groups = state.post.media_by_kind();
    if groups.is_empty() {
        state.set_status("No attachments Tusk can open");
        return Ok(());
    }

    state.set_status("Downloading attachments...");
    tui.draw(state)?;

    let client = download::client();
    let mut opened = 0;
    for (kind, urls) in groups {
        let files = rt.block_on(download::download_all(&client, &urls))?;
        dispatch::open_media(&mut ProcessRunner::new(tui), &files, kind, &state.config.media)?;
        opened += files.len();
    }
    state.set_status(format!("Opened {opened} attachment(s)"));
    Ok(())
}

fn compose(tui: &mut Tui, state: &mut AppState) -> crate::error::Result<()> {
    let initial = state
        .draft
        .clone()
        .unwrap_or_else(|| format!("@{} ", state.post.author_handle));
    let text = editor::open_editor(tui, &initial)?;
    if text.is_empty() {
        state.draft = None;
        state.set_status("Draft discarded");
    } else {
        state.set_status(format!("Draft saved ({} chars)", text.chars().count()));
        state.draft = Some(text);
    }
    Ok(())
}
