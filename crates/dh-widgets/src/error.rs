//! Error types for binding and rendering.

use dh_widgets_core::DomError;

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Result type alias for event delegation.
pub type DelegateResult<T> = std::result::Result<T, DelegateError>;

/// Errors raised while binding delegated events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DelegateError {
    /// An event selector could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// The document rejected an operation.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl From<dh_widgets_style::Error> for DelegateError {
    fn from(error: dh_widgets_style::Error) -> Self {
        match error {
            dh_widgets_style::Error::InvalidSelector { selector, message } => {
                Self::InvalidSelector { selector, message }
            }
            dh_widgets_style::Error::Dom(dom) => Self::Dom(dom),
        }
    }
}

/// Errors raised by a render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No connected element has the requested id.
    #[error("Root element '#{id}' not found")]
    RootNotFound { id: String },

    /// A custom slot returned content that cannot be placed.
    #[error("Invalid {slot} slot: {message}")]
    InvalidSlot { slot: &'static str, message: String },

    /// The merged options do not describe a valid configuration.
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// No factory is registered under this name.
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    /// `redraw` was called before the first `render`.
    #[error("Component '{0}' has not been rendered")]
    NotRendered(&'static str),

    /// Event binding failed.
    #[error(transparent)]
    Delegate(#[from] DelegateError),

    /// Stylesheet or icon work failed.
    #[error(transparent)]
    Style(#[from] dh_widgets_style::Error),

    /// The document rejected an operation.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl RenderError {
    /// Create a slot error.
    pub fn invalid_slot(slot: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidSlot {
            slot,
            message: message.into(),
        }
    }
}
