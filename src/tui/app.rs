//! Main application logic for the terminal user interface.
//!
//! `App` is the root of the screen. It owns the task store and all transient
//! form state, routes key presses to the add form, the task list, the edit
//! dialog or the image picker, and applies the mutations they ask for. No
//! other component writes to the store.

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, info, warn};

use crate::platform::{image_label, MediaLibrary, Permission, PermissionService};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::{
    colors::{DARK_GREEN, DARK_PURPLE, DARK_RED, GOLD},
    enums::{AppState, Focus, PickTarget},
    input::InputField,
    picker::{ImagePicker, PickerOutcome},
    task_form::{AddForm, EditDialog},
    task_list::{ListAction, TaskListView},
    toast::{Toast, TOAST_SHORT},
    utils::{centered_rect, truncate},
};

/// Root state for the task list screen.
pub struct App {
    state: AppState,
    focus: Focus,
    store: TaskStore,
    store_changed: Rc<Cell<bool>>,
    add_form: AddForm,
    edit_dialog: EditDialog,
    task_list: TaskListView,
    picker: Option<ImagePicker>,
    permissions: Box<dyn PermissionService>,
    library: Box<dyn MediaLibrary>,
    permission: Permission,
    permission_requested: bool,
    permission_granted: Option<bool>,
    pending_permission: Option<Receiver<bool>>,
    toast: Option<Toast>,
    status_message: String,
}

impl App {
    /// Build the screen and fire the one-off media permission request.
    pub fn new(
        permissions: Box<dyn PermissionService>,
        library: Box<dyn MediaLibrary>,
        platform_version: u32,
    ) -> Self {
        let mut store = TaskStore::new();
        let store_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&store_changed);
        store.subscribe(move |event, tasks| {
            debug!(?event, len = tasks.len(), "store changed");
            flag.set(true);
        });

        let mut app = App {
            state: AppState::TaskList,
            focus: Focus::AddForm,
            store,
            store_changed,
            add_form: AddForm::new(),
            edit_dialog: EditDialog::new(),
            task_list: TaskListView::new(),
            picker: None,
            permissions,
            library,
            permission: Permission::for_platform_version(platform_version),
            permission_requested: false,
            permission_granted: None,
            pending_permission: None,
            toast: None,
            status_message: String::new(),
        };
        app.request_media_permission();
        app
    }

    /// Ask for media access. Only the first call has an effect.
    fn request_media_permission(&mut self) {
        if self.permission_requested {
            return;
        }
        self.permission_requested = true;
        info!(permission = %self.permission, "requesting media permission");
        self.pending_permission = Some(self.permissions.request(self.permission));
    }

    fn poll_permission(&mut self, now: Instant) -> bool {
        let Some(rx) = &self.pending_permission else {
            return false;
        };
        let granted = match rx.try_recv() {
            Ok(granted) => granted,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => false,
        };
        self.pending_permission = None;
        self.permission_granted = Some(granted);
        if !granted {
            warn!(permission = %self.permission, "media permission denied");
            self.toast = Some(Toast::new("Permission denied", now, TOAST_SHORT));
        }
        true
    }

    /// Collect finished background work and expire notifications.
    /// Returns true when the screen needs to be redrawn.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> bool {
        let mut changed = self.poll_permission(now);
        if let Some(picker) = self.picker.as_mut() {
            changed |= picker.poll();
        }
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
            changed = true;
        }
        changed | self.sync_view()
    }

    /// React to store notifications by keeping the list selection valid.
    fn sync_view(&mut self) -> bool {
        if self.store_changed.replace(false) {
            self.task_list.clamp(self.store.len());
            true
        } else {
            false
        }
    }

    fn set_status_message(&mut self, msg: &str) {
        self.status_message = msg.to_string();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.add_form.title.active = focus == Focus::AddForm;
        if focus == Focus::TaskList {
            self.task_list.clamp(self.store.len());
        }
    }

    fn add_task(&mut self) {
        match self.add_form.submit() {
            Some((title, image_uri)) => {
                info!(title = %title, has_image = image_uri.is_some(), "adding task");
                self.store.add(&title, image_uri);
                self.set_status_message("Task added");
            }
            None => self.set_status_message("Title is required"),
        }
    }

    fn delete_task(&mut self, task: &Task) {
        info!(title = %task.title, "deleting task");
        self.store.remove(task);
        self.set_status_message("Task deleted");
    }

    fn open_edit(&mut self, task: &Task) {
        self.edit_dialog.open(task);
        self.state = AppState::EditTask;
    }

    fn confirm_edit(&mut self) {
        let Some(commit) = self.edit_dialog.confirm() else {
            self.set_status_message("Title is required");
            return;
        };
        self.state = AppState::TaskList;
        if self.store.position(&commit.original).is_none() {
            debug!(title = %commit.original.title, "edited task no longer present");
            return;
        }
        info!(from = %commit.original.title, to = %commit.title, "updating task");
        self.store
            .update(&commit.original, &commit.title, commit.image_uri);
        self.set_status_message("Task updated");
    }

    fn cancel_edit(&mut self) {
        self.edit_dialog.cancel();
        self.state = AppState::TaskList;
    }

    fn launch_picker(&mut self, target: PickTarget) {
        self.picker = Some(ImagePicker::launch(target, self.library.as_ref()));
        self.state = AppState::PickImage;
    }

    /// Route a key press to the active component.
    ///
    /// Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.clear_status_message();

        let should_quit = match self.state {
            AppState::TaskList => match self.focus {
                Focus::AddForm => self.handle_add_form_input(key),
                Focus::TaskList => self.handle_task_list_input(key),
            },
            AppState::EditTask => {
                self.handle_edit_input(key);
                false
            }
            AppState::PickImage => {
                self.handle_picker_input(key);
                false
            }
            AppState::Help => {
                self.handle_help_input(key.code);
                false
            }
        };
        self.sync_view();
        should_quit
    }

    fn handle_add_form_input(&mut self, key: KeyEvent) -> bool {
        if is_pick_key(&key) {
            self.launch_picker(PickTarget::AddForm);
            return false;
        }
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Enter => self.add_task(),
            KeyCode::Tab | KeyCode::BackTab => self.set_focus(self.focus.toggle()),
            KeyCode::Down => self.set_focus(Focus::TaskList),
            KeyCode::F(1) => self.state = AppState::Help,
            _ => edit_field(&mut self.add_form.title, &key),
        }
        false
    }

    fn handle_task_list_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Tab | KeyCode::BackTab => self.set_focus(self.focus.toggle()),
            KeyCode::Char('a') | KeyCode::Char('i') => self.set_focus(Focus::AddForm),
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1) => {
                self.state = AppState::Help
            }
            code => match self.task_list.handle_key(code, self.store.tasks()) {
                Some(ListAction::Edit(task)) => self.open_edit(&task),
                Some(ListAction::Delete(task)) => self.delete_task(&task),
                None => {}
            },
        }
        false
    }

    fn handle_edit_input(&mut self, key: KeyEvent) {
        if is_pick_key(&key) {
            self.launch_picker(PickTarget::EditDialog);
            return;
        }
        match key.code {
            KeyCode::Enter => self.confirm_edit(),
            KeyCode::Esc => self.cancel_edit(),
            _ => edit_field(&mut self.edit_dialog.title, &key),
        }
    }

    fn handle_picker_input(&mut self, key: KeyEvent) {
        let Some(picker) = self.picker.as_mut() else {
            self.state = AppState::TaskList;
            return;
        };
        let target = picker.target();
        match picker.handle_key(key.code) {
            PickerOutcome::Pending => return,
            PickerOutcome::Selected(uri) => {
                info!(?target, uri = %uri, "image picked");
                match target {
                    PickTarget::AddForm => self.add_form.set_image(uri),
                    PickTarget::EditDialog => self.edit_dialog.set_image(uri),
                }
            }
            PickerOutcome::Cancelled => debug!(?target, "image pick cancelled"),
        }
        self.picker = None;
        self.state = target.return_state();
    }

    fn handle_help_input(&mut self, key: KeyCode) {
        if matches!(
            key,
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1)
        ) {
            self.state = AppState::TaskList;
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let media = match self.permission_granted {
            Some(true) => "media: allowed",
            Some(false) => "media: denied",
            None => "media: asking",
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TASK LIST", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} tasks  {}", self.store.len(), media),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_add_form(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let focused = self.state == AppState::TaskList && self.add_form.title.active;
        let border_style = if focused {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        };
        let title_input = Paragraph::new(self.add_form.title.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("New Task Title * (Enter to add)")
                .border_style(border_style),
        );
        f.render_widget(title_input, chunks[0]);

        f.render_widget(image_preview(self.add_form.image_uri.as_deref()), chunks[1]);

        if focused {
            set_field_cursor(f, chunks[0], &self.add_form.title);
        }
    }

    fn render_edit_dialog(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 50, area);
        f.render_widget(Clear, area);

        let block = Block::default()
            .title("Edit Task")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_PURPLE).fg(Color::White));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        let title_input = Paragraph::new(self.edit_dialog.title.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Task Title")
                .border_style(Style::default().fg(GOLD)),
        );
        f.render_widget(title_input, chunks[0]);
        f.render_widget(image_preview(self.edit_dialog.image_uri.as_deref()), chunks[1]);
        f.render_widget(
            Paragraph::new("Enter save changes  Esc cancel  Ctrl+P pick image")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[2],
        );

        if self.state == AppState::EditTask {
            set_field_cursor(f, chunks[0], &self.edit_dialog.title);
        }
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Task List Help", bold)),
            Line::from(""),
            Line::from(Span::styled("New task form:", bold)),
            Line::from("  Type         Enter the task title"),
            Line::from("  Ctrl+P/F2    Pick an image"),
            Line::from("  Enter        Add the task"),
            Line::from("  Tab/↓        Move to the task list"),
            Line::from("  Esc          Quit"),
            Line::from(""),
            Line::from(Span::styled("Task list:", bold)),
            Line::from("  ↑/↓, k/j     Select task"),
            Line::from("  e/Enter      Edit selected task"),
            Line::from("  d/Delete     Delete selected task (no confirmation)"),
            Line::from("  Tab/a        Back to the new task form"),
            Line::from("  q/Esc        Quit"),
            Line::from(""),
            Line::from(Span::styled("Edit dialog:", bold)),
            Line::from("  Enter        Save changes"),
            Line::from("  Ctrl+P/F2    Pick a different image"),
            Line::from("  Esc          Cancel"),
            Line::from(""),
            Line::from("Tasks are kept in memory and are lost on exit."),
        ];

        f.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Esc to return"),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        if let Some(toast) = &self.toast {
            let status = Paragraph::new(toast.message.as_str())
                .style(Style::default().bg(DARK_RED).fg(Color::White).add_modifier(Modifier::BOLD));
            f.render_widget(status, area);
            return;
        }

        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match (self.state, self.focus) {
                (AppState::TaskList, Focus::AddForm) if self.add_form.is_composing() => {
                    "Enter add | Ctrl+P change image | Tab list".to_string()
                }
                (AppState::TaskList, Focus::AddForm) => {
                    "Type a title | Ctrl+P image | Enter add | Tab list | F1 help".to_string()
                }
                (AppState::TaskList, Focus::TaskList) => format!(
                    "Tasks: {} | e edit | d delete | ? help | q quit",
                    self.store.len()
                ),
                (AppState::EditTask, _) => match self.edit_dialog.editing() {
                    Some(task) => format!("Editing '{}'", truncate(&task.title, 40)),
                    None => "Edit Task".to_string(),
                },
                (AppState::PickImage, _) => "Pick Image".to_string(),
                (AppState::Help, _) => "Help".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(DARK_GREEN).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Draw the whole screen from the current state.
    pub fn render(&mut self, f: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        let body = outer[0];
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(body);

        self.render_header(f, chunks[0]);
        self.render_add_form(f, chunks[1]);
        let list_focused = self.state == AppState::TaskList && self.focus == Focus::TaskList;
        self.task_list
            .render(f, chunks[2], self.store.tasks(), list_focused);

        match self.state {
            AppState::TaskList => {}
            AppState::EditTask => self.render_edit_dialog(f, body),
            AppState::PickImage => {
                if self.edit_dialog.is_open() {
                    self.render_edit_dialog(f, body);
                }
                if let Some(picker) = self.picker.as_mut() {
                    picker.render(f, body);
                }
            }
            AppState::Help => self.render_help(f, body),
        }

        self.render_status_bar(f, outer[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Redraws only when input arrives or background work changes state.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let mut needs_redraw = true;
        loop {
            needs_redraw |= self.tick();
            if needs_redraw {
                terminal.draw(|f| self.render(f))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Ctrl+P or F2 opens the image picker from either form.
fn is_pick_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::F(2))
        || (key.code == KeyCode::Char('p') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Apply a text-editing key to `field`. Other keys are ignored.
fn edit_field(field: &mut InputField, key: &KeyEvent) {
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            field.handle_char(c)
        }
        KeyCode::Backspace => field.handle_backspace(),
        KeyCode::Delete => field.handle_delete(),
        KeyCode::Left => field.move_cursor_left(),
        KeyCode::Right => field.move_cursor_right(),
        KeyCode::Home => field.move_cursor_home(),
        KeyCode::End => field.move_cursor_end(),
        _ => {}
    }
}

fn set_field_cursor(f: &mut Frame, area: Rect, field: &InputField) {
    let max_x = area.width.saturating_sub(2);
    let x = (field.cursor as u16).min(max_x);
    f.set_cursor_position((area.x + x + 1, area.y + 1));
}

fn image_preview(uri: Option<&str>) -> Paragraph<'static> {
    let line = match uri {
        Some(uri) => Line::from(Span::styled(
            image_label(uri),
            Style::default().fg(Color::Cyan),
        )),
        None => Line::from(Span::styled(
            "none - Ctrl+P to pick",
            Style::default().fg(Color::DarkGray),
        )),
    };
    Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Image"))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::mpsc::{self, Receiver};

    use ratatui::backend::TestBackend;

    use super::*;
    use crate::error::PlatformError;
    use crate::platform::MediaItem;

    struct FakePermissions {
        granted: bool,
        requests: Rc<RefCell<Vec<Permission>>>,
    }

    impl PermissionService for FakePermissions {
        fn request(&self, permission: Permission) -> Receiver<bool> {
            self.requests.borrow_mut().push(permission);
            let (tx, rx) = mpsc::channel();
            tx.send(self.granted).unwrap();
            rx
        }
    }

    struct FakeLibrary {
        items: Vec<MediaItem>,
    }

    impl MediaLibrary for FakeLibrary {
        fn scan(&self, _mime_filter: &str) -> Receiver<Result<Vec<MediaItem>, PlatformError>> {
            let (tx, rx) = mpsc::channel();
            tx.send(Ok(self.items.clone())).unwrap();
            rx
        }
    }

    fn media(name: &str) -> MediaItem {
        MediaItem {
            uri: format!("file:///pics/{name}"),
            name: name.to_string(),
            mime: "image/png",
        }
    }

    fn make_app_with(granted: bool, platform_version: u32) -> (App, Rc<RefCell<Vec<Permission>>>) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let permissions = FakePermissions {
            granted,
            requests: Rc::clone(&requests),
        };
        let library = FakeLibrary {
            items: vec![media("cat.png"), media("dog.png")],
        };
        let app = App::new(Box::new(permissions), Box::new(library), platform_version);
        (app, requests)
    }

    fn make_app() -> App {
        let (mut app, _) = make_app_with(true, 34);
        app.tick();
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn seed(app: &mut App, tasks: &[Task]) {
        for task in tasks {
            app.store.add(&task.title, task.image_uri.clone());
        }
        app.tick();
    }

    fn milk() -> Task {
        Task::new("Buy milk", None)
    }

    fn call_mom() -> Task {
        Task::new("Call mom", Some("uri://img1".to_string()))
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    // ---- Permission gate ----

    #[test]
    fn test_permission_requested_once_at_startup() {
        let (mut app, requests) = make_app_with(true, 34);
        assert_eq!(*requests.borrow(), vec![Permission::ReadMediaImages]);

        app.request_media_permission();
        app.tick();
        assert_eq!(requests.borrow().len(), 1);
        assert_eq!(app.permission_granted, Some(true));
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_older_platform_uses_external_storage_permission() {
        let (_app, requests) = make_app_with(true, 30);
        assert_eq!(*requests.borrow(), vec![Permission::ReadExternalStorage]);
    }

    #[test]
    fn test_denied_permission_shows_expiring_toast_and_keeps_working() {
        let (mut app, _) = make_app_with(false, 34);
        let now = Instant::now();
        assert!(app.tick_at(now));
        assert_eq!(
            app.toast.as_ref().map(|t| t.message.as_str()),
            Some("Permission denied")
        );
        assert_eq!(app.permission_granted, Some(false));

        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.store.tasks(), &[milk()]);

        assert!(app.tick_at(now + Duration::from_secs(3)));
        assert!(app.toast.is_none());
    }

    // ---- Add form ----

    #[test]
    fn test_add_without_image() {
        let mut app = make_app();
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.store.tasks(), &[milk()]);
        assert!(!app.add_form.is_composing());
    }

    #[test]
    fn test_add_with_picked_image() {
        let mut app = make_app();
        seed(&mut app, &[milk()]);

        app.handle_key(ctrl('p'));
        assert_eq!(app.state, AppState::PickImage);
        app.tick();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.add_form.image_uri.as_deref(), Some("file:///pics/cat.png"));
        assert!(app.add_form.title.is_empty());

        type_text(&mut app, "Call mom");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.store.tasks(),
            &[milk(), Task::new("Call mom", Some("file:///pics/cat.png".to_string()))]
        );
        assert!(app.add_form.image_uri.is_none());
    }

    #[test]
    fn test_empty_title_never_reaches_the_store() {
        let mut app = make_app();
        app.add_form.set_image("uri://img1".to_string());
        app.handle_key(key(KeyCode::Enter));

        assert!(app.store.is_empty());
        assert_eq!(app.status_message, "Title is required");
        assert_eq!(app.add_form.image_uri.as_deref(), Some("uri://img1"));
    }

    #[test]
    fn test_cancelled_pick_keeps_previous_image() {
        let mut app = make_app();
        app.add_form.set_image("uri://img1".to_string());

        app.handle_key(key(KeyCode::F(2)));
        app.tick();
        app.handle_key(key(KeyCode::Esc));

        assert_eq!(app.state, AppState::TaskList);
        assert!(app.picker.is_none());
        assert_eq!(app.add_form.image_uri.as_deref(), Some("uri://img1"));
    }

    #[test]
    fn test_control_keys_are_not_typed() {
        let mut app = make_app();
        type_text(&mut app, "ab");
        app.handle_key(ctrl('x'));
        assert_eq!(app.add_form.title.value, "ab");
    }

    // ---- Task list ----

    #[test]
    fn test_delete_is_immediate() {
        let mut app = make_app();
        seed(&mut app, &[milk(), call_mom()]);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::TaskList);
        app.handle_key(key(KeyCode::Char('d')));

        assert_eq!(app.store.tasks(), &[call_mom()]);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.task_list.selected(), Some(0));
    }

    #[test]
    fn test_deleting_last_task_clears_selection() {
        let mut app = make_app();
        seed(&mut app, &[milk()]);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('d')));

        assert!(app.store.is_empty());
        assert_eq!(app.task_list.selected(), None);
    }

    // ---- Edit dialog ----

    #[test]
    fn test_edit_and_confirm() {
        let mut app = make_app();
        seed(&mut app, &[call_mom()]);

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(app.state, AppState::EditTask);
        assert_eq!(app.edit_dialog.editing(), Some(&call_mom()));
        assert_eq!(app.edit_dialog.title.value, "Call mom");

        type_text(&mut app, " urgently");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(
            app.store.tasks(),
            &[Task::new("Call mom urgently", Some("uri://img1".to_string()))]
        );
        assert!(!app.edit_dialog.is_open());
    }

    #[test]
    fn test_empty_title_keeps_dialog_open() {
        let mut app = make_app();
        seed(&mut app, &[call_mom()]);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('e')));

        for _ in 0.."Call mom".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::EditTask);
        assert!(app.edit_dialog.is_open());
        assert_eq!(app.store.tasks(), &[call_mom()]);
    }

    #[test]
    fn test_cancelling_edit_leaves_store_unchanged() {
        let mut app = make_app();
        seed(&mut app, &[milk(), call_mom()]);
        let before = app.store.tasks().to_vec();

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char('e')));
        type_text(&mut app, " later");
        app.handle_key(ctrl('p'));
        app.tick();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Esc));

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.tasks(), before.as_slice());
        assert!(!app.edit_dialog.is_open());
        assert!(app.edit_dialog.title.is_empty());
        assert!(app.edit_dialog.image_uri.is_none());
    }

    #[test]
    fn test_picking_in_dialog_only_changes_image() {
        let mut app = make_app();
        seed(&mut app, &[call_mom()]);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('e')));
        type_text(&mut app, "!");

        app.handle_key(ctrl('p'));
        app.tick();
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::EditTask);
        assert_eq!(app.edit_dialog.title.value, "Call mom!");
        assert_eq!(app.edit_dialog.image_uri.as_deref(), Some("file:///pics/dog.png"));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.store.tasks(),
            &[Task::new("Call mom!", Some("file:///pics/dog.png".to_string()))]
        );
    }

    #[test]
    fn test_confirming_edit_of_removed_task_is_silent() {
        let mut app = make_app();
        seed(&mut app, &[milk(), call_mom()]);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('e')));

        app.store.remove(&milk());
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.tasks(), &[call_mom()]);
        assert!(app.status_message.is_empty());
    }

    #[test]
    fn test_editing_a_duplicate_updates_first_match() {
        let mut app = make_app();
        seed(&mut app, &[milk(), call_mom(), milk()]);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::End));
        app.handle_key(key(KeyCode::Char('e')));
        type_text(&mut app, "!");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(
            app.store.tasks(),
            &[Task::new("Buy milk!", None), call_mom(), milk()]
        );
    }

    // ---- Navigation ----

    #[test]
    fn test_quit_keys() {
        let mut app = make_app();
        assert!(app.handle_key(ctrl('c')));
        assert!(app.handle_key(key(KeyCode::Esc)));

        app.handle_key(key(KeyCode::Tab));
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_help_opens_and_closes() {
        let mut app = make_app();
        app.handle_key(key(KeyCode::F(1)));
        assert_eq!(app.state, AppState::Help);
        assert!(!app.handle_key(key(KeyCode::Esc)));
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.focus, Focus::AddForm);
    }

    // ---- Rendering ----

    #[test]
    fn test_render_shows_tasks_in_order() {
        let mut app = make_app();
        seed(&mut app, &[milk(), call_mom()]);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let text = screen_text(&terminal);

        let milk_at = text.find("Buy milk").unwrap();
        let mom_at = text.find("Call mom").unwrap();
        assert!(milk_at < mom_at);
        assert!(text.contains("[img: img1]"));
        assert!(text.contains("TASK LIST"));
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut app = make_app();
        seed(&mut app, &[milk(), call_mom()]);

        let mut first = Terminal::new(TestBackend::new(100, 30)).unwrap();
        first.draw(|f| app.render(f)).unwrap();
        let mut second = Terminal::new(TestBackend::new(100, 30)).unwrap();
        second.draw(|f| app.render(f)).unwrap();

        assert_eq!(first.backend().buffer(), second.backend().buffer());
    }

    #[test]
    fn test_render_modal_states() {
        let mut app = make_app();
        seed(&mut app, &[call_mom()]);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('e')));
        terminal.draw(|f| app.render(f)).unwrap();
        assert!(screen_text(&terminal).contains("Edit Task"));

        app.handle_key(ctrl('p'));
        terminal.draw(|f| app.render(f)).unwrap();
        assert!(screen_text(&terminal).contains("Looking for images"));
        app.tick();
        terminal.draw(|f| app.render(f)).unwrap();
        assert!(screen_text(&terminal).contains("cat.png"));

        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('?')));
        terminal.draw(|f| app.render(f)).unwrap();
        assert!(screen_text(&terminal).contains("Task List Help"));
    }

    #[test]
    fn test_render_permission_toast() {
        let (mut app, _) = make_app_with(false, 34);
        app.tick();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        assert!(screen_text(&terminal).contains("Permission denied"));
    }
}
