use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiError {
    /// `init` was called on a manager that already has a loader.
    AlreadyInitialized,
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::AlreadyInitialized => write!(f, "ui manager is already initialized"),
        }
    }
}

impl std::error::Error for UiError {}
