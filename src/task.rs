//! Task data structure.
//!
//! A `Task` is an immutable value: a title plus an optional reference to an
//! image. There is no identifier field, so two tasks with the same title and
//! image are the same task as far as lookups are concerned.

/// A single entry in the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub title: String,
    pub image_uri: Option<String>,
}

impl Task {
    pub fn new(title: impl Into<String>, image_uri: Option<String>) -> Self {
        Self {
            title: title.into(),
            image_uri,
        }
    }

    /// Produce the replacement value used when this task is edited.
    pub fn with_changes(&self, title: &str, image_uri: Option<String>) -> Self {
        Self {
            title: title.to_string(),
            image_uri,
        }
    }
}
