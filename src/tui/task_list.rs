//! Task list view and task item rows.
//!
//! The view renders whatever slice of tasks it is given, in order. It never
//! mutates the store; key presses become [`ListAction`]s for `App` to apply.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::platform::image_label;
use crate::task::Task;
use crate::tui::colors::GOLD;

/// A request raised by a task item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Edit(Task),
    Delete(Task),
}

/// Scrollable list of task items with a selection cursor.
#[derive(Debug, Default)]
pub struct TaskListView {
    state: ListState,
}

impl TaskListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// Keep the selection inside a list of `len` items.
    pub fn clamp(&mut self, len: usize) {
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(i));
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.state.select(Some(i));
    }

    /// Handle a key press while the list has focus.
    pub fn handle_key(&mut self, key: KeyCode, tasks: &[Task]) -> Option<ListAction> {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(tasks.len()),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(tasks.len()),
            KeyCode::Home => self.clamp_to(0, tasks.len()),
            KeyCode::End => self.clamp_to(tasks.len().saturating_sub(1), tasks.len()),
            KeyCode::Char('e') | KeyCode::Enter => {
                return self.selected_task(tasks).cloned().map(ListAction::Edit);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                return self.selected_task(tasks).cloned().map(ListAction::Delete);
            }
            _ => {}
        }
        None
    }

    fn clamp_to(&mut self, index: usize, len: usize) {
        if len > 0 {
            self.state.select(Some(index.min(len - 1)));
        }
    }

    fn selected_task<'a>(&self, tasks: &'a [Task]) -> Option<&'a Task> {
        self.state.selected().and_then(|i| tasks.get(i))
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, tasks: &[Task], focused: bool) {
        let items: Vec<ListItem> = tasks.iter().map(task_item).collect();

        let title = if focused {
            format!("Tasks ({}) - e edit  d delete  Tab add", tasks.len())
        } else {
            format!("Tasks ({})", tasks.len())
        };
        let border_style = if focused {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(border_style),
            )
            .highlight_style(if focused {
                Style::default().bg(Color::Gray).fg(Color::Black)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            })
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

/// One row: the title, then the attached image's label if there is one.
pub fn task_item(task: &Task) -> ListItem<'static> {
    let mut spans = vec![Span::styled(task.title.clone(), Style::default().fg(Color::White))];
    if let Some(uri) = &task.image_uri {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[img: {}]", image_label(uri)),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ));
    }
    ListItem::new(Line::from(spans))
}
