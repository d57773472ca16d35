//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{AppState, Mode};

/// Something the key asked for that needs the terminal or the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open link `n` (zero-based) with the routed program
    OpenLink(usize),
    /// Open the selected link with custom opener `n`
    OpenCustom(usize),
    /// Download and open all attachments
    OpenMedia,
    /// Draft a reply in the editor
    Compose,
}

/// Handle key events, returning an optional action
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<Action> {
    match state.mode {
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::PickOpener => {
            state.mode = Mode::Normal;
            return match key.code {
                KeyCode::Char(c @ '1'..='9') => {
                    let index = digit_index(c);
                    if index < state.router.custom_openers().len() {
                        Some(Action::OpenCustom(index))
                    } else {
                        state.set_status(format!("No custom opener {c}"));
                        None
                    }
                }
                _ => {
                    state.set_status("");
                    None
                }
            };
        }
        Mode::Normal => {}
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            None
        }

        // Link selection
        (_, KeyCode::Char('j') | KeyCode::Down) => {
            state.select_next_link();
            None
        }
        (_, KeyCode::Char('k') | KeyCode::Up) => {
            state.select_prev_link();
            None
        }

        // Body scrolling
        (_, KeyCode::PageDown | KeyCode::Char(' ')) => {
            state.scroll = state.scroll.saturating_add(5);
            None
        }
        (_, KeyCode::PageUp) => {
            state.scroll = state.scroll.saturating_sub(5);
            None
        }

        // Actions
        (_, KeyCode::Enter) => {
            if state.selected_link().is_some() {
                Some(Action::OpenLink(state.selected_link))
            } else {
                state.set_status("No links in this post");
                None
            }
        }
        (_, KeyCode::Char(c @ '1'..='9')) => {
            let index = digit_index(c);
            if index < state.rendered.links.len() {
                state.selected_link = index;
                Some(Action::OpenLink(index))
            } else {
                state.set_status(format!("No link {c}"));
                None
            }
        }
        (_, KeyCode::Char('c')) => {
            if state.router.custom_openers().is_empty() {
                state.set_status("No custom openers configured");
            } else if state.selected_link().is_none() {
                state.set_status("No links in this post");
            } else {
                state.mode = Mode::PickOpener;
                state.set_status("Open with custom opener: press 1-5");
            }
            None
        }
        (_, KeyCode::Char('m')) => {
            if state.post.media.is_empty() {
                state.set_status("No attachments");
                None
            } else {
                Some(Action::OpenMedia)
            }
        }
        (_, KeyCode::Char('e')) => Some(Action::Compose),
        _ => None,
    }
}

fn digit_index(c: char) -> usize {
    c.to_digit(10).map_or(0, |d| d as usize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, CustomConfig};
    use crate::models::Post;
    use crate::router::Router;

    fn state(custom: usize) -> AppState {
        let post = Post::from_status_json(
            r#"{"id": "1", "created_at": "2024-05-20T10:00:00Z",
                "content": "<p><a href=\"https://a.example\">a</a> <a href=\"https://b.example\">b</a></p>",
                "url": null, "account": {"username": "ann"}}"#,
        )
        .unwrap();
        let mut config = Config::default();
        config.open_custom = (0..custom)
            .map(|i| CustomConfig {
                name: format!("c{i}"),
                program: "imv".to_string(),
                terminal: false,
            })
            .collect();
        let router = Router::from_config(&config).unwrap();
        AppState::new(config, router, post)
    }

    fn press(state: &mut AppState, code: KeyCode) -> Option<Action> {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_digit_opens_link() {
        let mut state = state(0);
        assert_eq!(press(&mut state, KeyCode::Char('2')), Some(Action::OpenLink(1)));
        assert_eq!(state.selected_link, 1);
        assert_eq!(press(&mut state, KeyCode::Char('3')), None);
        assert!(state.status.contains("No link 3"));
    }

    #[test]
    fn test_enter_opens_selected() {
        let mut state = state(0);
        press(&mut state, KeyCode::Char('j'));
        assert_eq!(press(&mut state, KeyCode::Enter), Some(Action::OpenLink(1)));
    }

    #[test]
    fn test_custom_opener_flow() {
        let mut state = state(2);
        assert_eq!(press(&mut state, KeyCode::Char('c')), None);
        assert_eq!(state.mode, Mode::PickOpener);
        assert_eq!(press(&mut state, KeyCode::Char('2')), Some(Action::OpenCustom(1)));
        assert_eq!(state.mode, Mode::Normal);

        press(&mut state, KeyCode::Char('c'));
        assert_eq!(press(&mut state, KeyCode::Char('5')), None);
    }

    #[test]
    fn test_no_media() {
        let mut state = state(0);
        assert_eq!(press(&mut state, KeyCode::Char('m')), None);
        assert_eq!(state.status, "No attachments");
    }

    #[test]
    fn test_quit() {
        let mut state = state(0);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }
}
