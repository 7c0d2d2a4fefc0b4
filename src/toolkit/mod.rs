//! Toolkit Module - The context object that owns everything.
//!
//! A [`Toolkit`] bundles the component tree, the event queue, the window
//! stack, the terminal backend and the configuration. It is created on the
//! thread that will dispatch events and may only exist once per thread.
//!
//! # Structure
//!
//! - `window` - [`WindowStack`], showing, hiding and placing windows
//! - `dispatch` - The event loop and per-event routing
//! - `input` - Turning backend input into key and mouse events
//!
//! # Example
//!
//! ```ignore
//! let mut toolkit = Toolkit::new(CrosstermTerminal::new()?, ToolkitConfig::default())?;
//! let frame = toolkit.create_frame("Hello", None)?;
//! let label = toolkit.tree_mut().create_widget(Label::new("Hello, world"));
//! toolkit.tree_mut().add(frame, label, Edge::Center)?;
//! toolkit.show(frame)?;
//! toolkit.run()?;
//! ```

mod dispatch;
mod input;
mod window;

use std::cell::Cell;

use tracing::info;

use crate::config::ToolkitConfig;
use crate::engine::Tree;
use crate::error::{Result, ToolkitError};
use crate::event::EventQueue;
use crate::render::Terminal;
use crate::types::Size;

pub use window::WindowStack;

thread_local! {
    /// Set while a toolkit exists on this thread.
    static ACTIVE: Cell<bool> = const { Cell::new(false) };
}

pub struct Toolkit {
    tree: Tree,
    queue: EventQueue,
    windows: WindowStack,
    terminal: Box<dyn Terminal>,
    config: ToolkitConfig,
    /// Serial handed to the next peer.
    next_peer: u64,
}

impl Toolkit {
    /// Create the toolkit and make the calling thread its dispatch thread.
    ///
    /// Fails with [`ToolkitError::AlreadyInitialized`] if this thread already
    /// has one.
    pub fn new(terminal: impl Terminal + 'static, config: ToolkitConfig) -> Result<Self> {
        if ACTIVE.with(|active| active.replace(true)) {
            return Err(ToolkitError::AlreadyInitialized);
        }

        let queue = EventQueue::new();
        queue.bind_dispatch_thread();
        let windows = WindowStack::default();
        let terminal: Box<dyn Terminal> = Box::new(terminal);

        let size = terminal.screen_size();
        info!(width = size.width, height = size.height, "toolkit started");

        Ok(Self {
            tree: Tree::new(queue.clone(), windows.clone()),
            queue,
            windows,
            terminal,
            config,
            next_peer: 0,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Handle for posting events, also from other threads.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn screen_size(&self) -> Size {
        self.terminal.screen_size()
    }
}

impl Drop for Toolkit {
    fn drop(&mut self) {
        self.queue.unbind_dispatch_thread();
        ACTIVE.with(|active| active.set(false));
        info!("toolkit stopped");
    }
}

// =============================================================================
// TESTS
// =============================================================================
