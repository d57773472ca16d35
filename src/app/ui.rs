//! UI rendering for the TUI

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::state::{AppState, Mode};
use crate::models::MediaType;

const ACCENT: Color = Color::Magenta;
const MUTED: Color = Color::DarkGray;

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    let links_height = (state.rendered.links.len() as u16).clamp(1, 9) + 2;
    let media_height = if state.post.media.is_empty() {
        0
    } else {
        (state.post.media.len() as u16).min(6) + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),             // Header
            Constraint::Min(3),                // Body
            Constraint::Length(links_height),  // Links
            Constraint::Length(media_height),  // Attachments
            Constraint::Length(1),             // Status bar
        ])
        .split(area);

    render_header(frame, state, chunks[0]);
    render_body(frame, state, chunks[1]);
    render_links(frame, state, chunks[2]);
    if media_height > 0 {
        render_media(frame, state, chunks[3]);
    }
    render_status_bar(frame, state, chunks[4]);

    if state.mode == Mode::Help {
        render_help_popup(frame);
    }
}

fn render_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let post = &state.post;
    let mut first = vec![
        Span::styled(
            post.author_name.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" @{}", post.author_handle), Style::default().fg(MUTED)),
        Span::raw(" · "),
        Span::raw(state.post_date(&Local::now())),
    ];
    if let Some(by) = &post.repost_author {
        first.push(Span::styled(format!("  🔁 {by}"), Style::default().fg(Color::Green)));
    }

    let second = if post.spoiler_text.is_empty() {
        Line::from(Span::styled(
            post.url.clone().unwrap_or_default(),
            Style::default().fg(MUTED),
        ))
    } else {
        Line::from(Span::styled(
            format!("CW: {}", post.spoiler_text),
            Style::default().fg(Color::Yellow),
        ))
    };

    frame.render_widget(Paragraph::new(vec![Line::from(first), second]), area);
}

fn render_body(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED));
    let body = Paragraph::new(state.rendered.text.as_str())
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    frame.render_widget(body, area);
}

fn render_links(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default()
        .title(" Links ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED));

    if state.rendered.links.is_empty() {
        let empty = Paragraph::new(Span::styled("No links", Style::default().fg(MUTED)))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .rendered
        .links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let style = if i == state.selected_link {
                Style::default().fg(Color::Black).bg(ACCENT)
            } else {
                Style::default()
            };
            let marker = if link.is_mention() { "@ " } else { "" };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>2} ", i + 1), Style::default().fg(ACCENT)),
                Span::styled(format!("{marker}{}", link.text), style),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn render_media(frame: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default()
        .title(" Attachments (m to open) ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED));

    let items: Vec<ListItem> = state
        .post
        .media
        .iter()
        .map(|m| {
            let icon = match m.media_type {
                MediaType::Image => "🖼",
                MediaType::Video | MediaType::Gifv => "🎬",
                MediaType::Audio => "🎵",
                MediaType::Unknown => "?",
            };
            let label = m.alt_text.clone().unwrap_or_else(|| m.url.clone());
            ListItem::new(format!("{icon} {label}"))
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let content = if state.status.is_empty() {
        vec![
            Span::styled(" Enter/1-9", Style::default().fg(ACCENT)),
            Span::styled(": open link  ", Style::default().fg(MUTED)),
            Span::styled("c", Style::default().fg(ACCENT)),
            Span::styled(": open with  ", Style::default().fg(MUTED)),
            Span::styled("m", Style::default().fg(ACCENT)),
            Span::styled(": media  ", Style::default().fg(MUTED)),
            Span::styled("?", Style::default().fg(ACCENT)),
            Span::styled(": help", Style::default().fg(MUTED)),
        ]
    } else {
        vec![Span::raw(" "), Span::raw(state.status.as_str())]
    };
    frame.render_widget(Paragraph::new(Line::from(content)), area);
}

fn render_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {k:<12}"), Style::default().fg(ACCENT)),
            Span::raw(what),
        ])
    };
    let help = vec![
        Line::from(""),
        key("j/k", "Select link"),
        key("Enter", "Open selected link"),
        key("1-9", "Open link by number"),
        key("c then 1-5", "Open selected link with custom opener"),
        key("m", "Download and open attachments"),
        key("e", "Draft a reply in $EDITOR"),
        key("Space/PgUp", "Scroll post"),
        key("q", "Quit"),
    ];
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT));
    frame.render_widget(Paragraph::new(help).block(block), popup_area);
}

/// Helper to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}
