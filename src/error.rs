//! Toolkit error types.

use std::any::Any;

use thiserror::Error;

use crate::engine::ComponentId;

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("component {0} does not exist")]
    UnknownComponent(ComponentId),

    #[error("component {0} is not a container")]
    NotAContainer(ComponentId),

    #[error("component {child} is not a child of {parent}")]
    NotAChild {
        parent: ComponentId,
        child: ComponentId,
    },

    #[error("adding {child} to {parent} would create a cycle")]
    Cycle {
        parent: ComponentId,
        child: ComponentId,
    },

    #[error("window {0} cannot be added to a container")]
    WindowNesting(ComponentId),

    #[error("cannot hide {0}: no other focus-traversable component can take the focus")]
    NoFocusSuccessor(ComponentId),

    #[error("window {0} is not the topmost window")]
    NotTopmost(ComponentId),

    #[error("window {0} is showing")]
    WindowShowing(ComponentId),

    #[error("visibility of window {0} is controlled by show/hide")]
    WindowVisibility(ComponentId),

    #[error("component {0} is not a window")]
    NotAWindow(ComponentId),

    #[error("layout constraint rejected: {0}")]
    Constraint(String),

    #[error("no card named {0:?}")]
    UnknownCard(String),

    #[error("container {0} does not use a card layout")]
    NotACardLayout(ComponentId),

    #[error("a toolkit is already running on this thread")]
    AlreadyInitialized,

    #[error("invoke_and_wait called from the dispatch thread")]
    WaitOnDispatchThread,

    #[error("invoked task panicked: {0}")]
    InvocationFailed(String),

    #[error("invoked task was discarded before it ran")]
    InvocationDiscarded,

    #[error("terminal i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ToolkitError>;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
