//! Enumerations for TUI state management.

/// Which screen or modal currently receives input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    EditTask,
    PickImage,
    Help,
}

/// Which part of the main screen has keyboard focus.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    AddForm,
    TaskList,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::AddForm => Focus::TaskList,
            Focus::TaskList => Focus::AddForm,
        }
    }
}

/// The form that receives the result of an image pick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PickTarget {
    AddForm,
    EditDialog,
}

impl PickTarget {
    /// State to return to once the picker closes.
    pub fn return_state(self) -> AppState {
        match self {
            PickTarget::AddForm => AppState::TaskList,
            PickTarget::EditDialog => AppState::EditTask,
        }
    }
}
