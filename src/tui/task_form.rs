//! Staging state for the add form and the edit dialog.
//!
//! Neither form touches the store. They hold uncommitted values and hand
//! back what should be written once the user confirms; `App` applies it.

use crate::task::Task;
use crate::tui::input::InputField;

/// Inline form for composing a new task.
///
/// Idle when both fields are empty, composing otherwise. A successful
/// submit returns the new task's values and goes back to idle.
#[derive(Debug, Default)]
pub struct AddForm {
    pub title: InputField,
    pub image_uri: Option<String>,
}

impl AddForm {
    pub fn new() -> Self {
        let mut form = Self::default();
        form.title.active = true;
        form
    }

    pub fn is_composing(&self) -> bool {
        !self.title.is_empty() || self.image_uri.is_some()
    }

    pub fn set_image(&mut self, uri: String) {
        self.image_uri = Some(uri);
    }

    /// Take the staged title and image if the title is non-empty.
    /// An empty title leaves the form untouched and returns `None`.
    pub fn submit(&mut self) -> Option<(String, Option<String>)> {
        if self.title.is_empty() {
            return None;
        }
        let title = self.title.value.clone();
        self.title.clear();
        Some((title, self.image_uri.take()))
    }
}

/// What a confirmed edit should write back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommit {
    pub original: Task,
    pub title: String,
    pub image_uri: Option<String>,
}

/// Modal form bound to the task currently being edited.
#[derive(Debug, Default)]
pub struct EditDialog {
    editing: Option<Task>,
    pub title: InputField,
    pub image_uri: Option<String>,
}

impl EditDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.editing.is_some()
    }

    /// The task value the dialog was opened for.
    pub fn editing(&self) -> Option<&Task> {
        self.editing.as_ref()
    }

    /// Seed the staging fields from `task` and open the dialog.
    pub fn open(&mut self, task: &Task) {
        self.editing = Some(task.clone());
        self.title = InputField::with_value(&task.title);
        self.title.active = true;
        self.image_uri = task.image_uri.clone();
    }

    /// Replace the staged image. Ignored while closed.
    pub fn set_image(&mut self, uri: String) {
        if self.is_open() {
            self.image_uri = Some(uri);
        }
    }

    /// Close with the staged values. An empty staged title keeps the dialog
    /// open and returns `None`.
    pub fn confirm(&mut self) -> Option<EditCommit> {
        if self.title.is_empty() {
            return None;
        }
        let original = self.editing.take()?;
        let commit = EditCommit {
            original,
            title: std::mem::take(&mut self.title.value),
            image_uri: self.image_uri.take(),
        };
        self.cancel();
        Some(commit)
    }

    /// Close and discard all staged values.
    pub fn cancel(&mut self) {
        self.editing = None;
        self.title = InputField::new();
        self.image_uri = None;
    }
}
