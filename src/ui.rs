//! UI rendering helpers for the terminal user interface.
//!
//! `draw` projects the player and the view state into `ratatui` widgets. It
//! owns no playback state and can be called as often as needed.

mod labels;
mod view;

pub use labels::{TransportLabels, playlist_row, transport_labels};
pub use view::ViewState;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::audio::AudioOutput;
use crate::config::{ControlsSettings, UiSettings};
use crate::lyrics::TextSource;
use crate::player::{Player, TextStatus};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next chapter");
    // H/L and +/- are filled dynamically from config.
    map.insert("r", "loop");
    map.insert("m", "reload manifest");
    map.insert("v", "playlist");
    map.insert("c", "controls");
    map.insert("q", "quit");
    map
});

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text, incorporating scrub seconds and volume step.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = ["space/p", "h/l", "H/L", "+/-", "r", "m", "v", "c", "q"];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!("[+/-] volume ±{}", controls.volume_step)),
            _ => CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn time_text(position: Duration, duration: Option<Duration>) -> String {
    match duration {
        Some(total) => format!("{} / {}", format_mmss(position), format_mmss(total)),
        None => format_mmss(position),
    }
}

/// Window `[start, end)` of `total` rows that fits `height` and keeps
/// `selected` centered where possible, plus the selection's offset in it.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn transport_paragraph<'a>(
    labels: &TransportLabels,
    time: String,
    notice: Option<&str>,
) -> Paragraph<'a> {
    let mut lines = vec![
        Line::from(labels.now_playing.clone()).bold(),
        Line::from(format!("{}  [{}]", labels.book_chapter, time)),
        Line::from(format!(
            "{} • {} • {}",
            labels.play_pause, labels.loop_mode, labels.volume
        )),
    ];
    if let Some(n) = notice {
        lines.push(Line::from(n.to_string()).italic());
    }
    Paragraph::new(lines)
        .block(Block::bordered().padding(LEFT_PAD).title(" now playing "))
        .wrap(Wrap { trim: true })
}

fn render_verses<O: AudioOutput, T: TextSource>(
    frame: &mut Frame,
    area: Rect,
    player: &Player<O, T>,
    view: &ViewState,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .padding(LEFT_PAD)
        .title(" text ");

    let verses = player.verses();
    if verses.is_empty() {
        let message = match player.text_status() {
            TextStatus::Loading => "Loading…",
            TextStatus::Idle => "",
            _ => player.text_placeholder().unwrap_or_default(),
        };
        let p = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(p, area);
        return;
    }

    // Only build items for the visible window.
    let height = area.height.saturating_sub(2) as usize;
    let active = view.highlighted().filter(|&i| i < verses.len());
    let (start, end, pos) = visible_window(verses.len(), height, active.unwrap_or(0));
    let items: Vec<ListItem> = verses[start..end]
        .iter()
        .map(|v| ListItem::new(v.as_str()))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));
    let mut state = ListState::default();
    if active.is_some() {
        state.select(Some(pos));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_playlist<O: AudioOutput, T: TextSource>(
    frame: &mut Frame,
    area: Rect,
    player: &Player<O, T>,
) {
    let tracks = player.store().tracks();
    let height = area.height.saturating_sub(2) as usize;
    let current = player.store().index();
    let (start, end, pos) = visible_window(tracks.len(), height, current);

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .map(|t| ListItem::new(playlist_row(t)))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" playlist ({}) ", tracks.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !tracks.is_empty() {
        state.select(Some(pos));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame`.
pub fn draw<O: AudioOutput, T: TextSource>(
    frame: &mut Frame,
    player: &Player<O, T>,
    view: &ViewState,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(1),
            Constraint::Length(if view.show_controls() { 4 } else { 0 }),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" lectern ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let state = player.state();
    let labels = transport_labels(player.current_track(), &state);
    let time = time_text(player.position(), player.duration());
    frame.render_widget(transport_paragraph(&labels, time, view.notice()), chunks[1]);

    if view.show_playlist() {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[2]);
        render_verses(frame, body[0], player, view);
        render_playlist(frame, body[1], player);
    } else {
        render_verses(frame, chunks[2], player, view);
    }

    if !view.show_controls() {
        return;
    }
    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests;
