//! Image picker overlay.
//!
//! Launching the picker asks the media library for candidates on a
//! background thread. The overlay shows a loading state until the scan
//! arrives, then lets the user choose an item or back out.

use std::sync::mpsc::{Receiver, TryRecvError};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use crate::error::PlatformError;
use crate::platform::{MediaItem, MediaLibrary, IMAGE_MIME_FILTER};
use crate::tui::{colors::DARK_PURPLE, enums::PickTarget, utils::centered_rect};

/// Progress of the candidate scan.
#[derive(Debug)]
pub enum PickerStatus {
    Loading,
    Ready(Vec<MediaItem>),
    Failed(String),
}

/// Result of a key press inside the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Pending,
    Selected(String),
    Cancelled,
}

pub struct ImagePicker {
    target: PickTarget,
    status: PickerStatus,
    state: ListState,
    pending: Option<Receiver<Result<Vec<MediaItem>, PlatformError>>>,
}

impl ImagePicker {
    /// Start a pick for `target`, scoped to image types.
    pub fn launch(target: PickTarget, library: &dyn MediaLibrary) -> Self {
        debug!(?target, "image picker launched");
        Self {
            target,
            status: PickerStatus::Loading,
            state: ListState::default(),
            pending: Some(library.scan(IMAGE_MIME_FILTER)),
        }
    }

    pub fn target(&self) -> PickTarget {
        self.target
    }

    pub fn status(&self) -> &PickerStatus {
        &self.status
    }

    /// Collect the scan result if it has arrived. Returns true on change.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(PlatformError::Abandoned),
        };
        self.pending = None;
        self.status = match result {
            Ok(items) => {
                self.state.select(if items.is_empty() { None } else { Some(0) });
                PickerStatus::Ready(items)
            }
            Err(e) => PickerStatus::Failed(e.to_string()),
        };
        true
    }

    pub fn handle_key(&mut self, key: KeyCode) -> PickerOutcome {
        let len = match &self.status {
            PickerStatus::Ready(items) => items.len(),
            _ => 0,
        };
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return PickerOutcome::Cancelled,
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                let i = self.state.selected().map_or(0, |i| i.saturating_sub(1));
                self.state.select(Some(i));
            }
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                let i = self.state.selected().map_or(0, |i| (i + 1).min(len - 1));
                self.state.select(Some(i));
            }
            KeyCode::Enter => {
                if let (PickerStatus::Ready(items), Some(i)) = (&self.status, self.state.selected()) {
                    if let Some(item) = items.get(i) {
                        return PickerOutcome::Selected(item.uri.clone());
                    }
                }
            }
            _ => {}
        }
        PickerOutcome::Pending
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(70, 60, area);
        f.render_widget(Clear, area);

        let block = Block::default()
            .title("Pick Image")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_PURPLE).fg(Color::White));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        match &self.status {
            PickerStatus::Loading => {
                f.render_widget(Paragraph::new("Looking for images..."), chunks[0]);
            }
            PickerStatus::Failed(message) => {
                let text = vec![
                    Line::from(Span::styled(
                        "No images available",
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(message.as_str()),
                ];
                f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), chunks[0]);
            }
            PickerStatus::Ready(items) if items.is_empty() => {
                f.render_widget(Paragraph::new("No images found"), chunks[0]);
            }
            PickerStatus::Ready(items) => {
                let rows: Vec<ListItem> = items
                    .iter()
                    .map(|item| {
                        ListItem::new(Line::from(vec![
                            Span::raw(item.name.clone()),
                            Span::styled(
                                format!("  {}", item.mime),
                                Style::default().fg(Color::Gray),
                            ),
                        ]))
                    })
                    .collect();
                let list = List::new(rows)
                    .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
                    .highlight_symbol(">> ");
                f.render_stateful_widget(list, chunks[0], &mut self.state);
            }
        }

        f.render_widget(
            Paragraph::new("↑/↓ choose  Enter attach  Esc cancel"),
            chunks[1],
        );
    }
}
