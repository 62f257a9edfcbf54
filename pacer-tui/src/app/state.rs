// pacer-tui/src/app/state.rs

// Represents the active UI tab
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Plan,
    Calendar,
}

// Represents the state of active modals
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    None,
    Help,
    ConfirmCancel,
}
