//! In-memory task store.
//!
//! `TaskStore` is the single source of truth for the task list. It lives for
//! the lifetime of the screen and is never written to disk. Views register
//! observers with [`TaskStore::subscribe`] and are told about every effective
//! mutation so they can re-render.

use tracing::debug;

use crate::task::Task;

/// Describes a mutation that has just been applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Added { index: usize },
    Removed { index: usize },
    Replaced { index: usize },
}

/// Handle returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&StoreEvent, &[Task])>;

/// Ordered collection of tasks; insertion order is display order.
#[derive(Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of the list.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Position of the first task structurally equal to `task`.
    pub fn position(&self, task: &Task) -> Option<usize> {
        self.tasks.iter().position(|t| t == task)
    }

    /// Append a new task. The caller guarantees `title` is non-empty.
    pub fn add(&mut self, title: &str, image_uri: Option<String>) {
        self.tasks.push(Task::new(title, image_uri));
        let index = self.tasks.len() - 1;
        debug!(index, "task added");
        self.notify(StoreEvent::Added { index });
    }

    /// Remove the first task equal to `task`. Absent tasks are ignored.
    pub fn remove(&mut self, task: &Task) {
        if let Some(index) = self.position(task) {
            self.tasks.remove(index);
            debug!(index, "task removed");
            self.notify(StoreEvent::Removed { index });
        }
    }

    /// Replace the first task equal to `task` with the edited values.
    /// Does nothing if the task is no longer in the store.
    pub fn update(&mut self, task: &Task, new_title: &str, new_image_uri: Option<String>) {
        if let Some(index) = self.position(task) {
            self.tasks[index] = task.with_changes(new_title, new_image_uri);
            debug!(index, "task replaced");
            self.notify(StoreEvent::Replaced { index });
        }
    }

    /// Register an observer that runs after every effective mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent, &[Task]) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event, &self.tasks);
        }
    }
}
