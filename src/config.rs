//! Toolkit configuration.
//!
//! Plain struct with defaults; build one with struct-update syntax or the
//! chained setters:
//!
//! ```ignore
//! let config = ToolkitConfig {
//!     poll_interval: Duration::from_millis(10),
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use crate::types::{Color, ColorPair};

#[derive(Debug, Clone, PartialEq)]
pub struct ToolkitConfig {
    /// Colours for components that set none and have no coloured ancestor.
    pub default_colors: ColorPair,
    /// How long the dispatch loop waits on the backend for a key when the
    /// queue is empty.
    pub poll_interval: Duration,
    /// Tab / BackTab move the focus when no component consumes them.
    pub tab_traversal: bool,
    /// Skip painting windows that are entirely covered by windows above.
    pub skip_obscured_windows: bool,
    /// Hide the terminal cursor when no component holds the focus.
    pub hide_idle_cursor: bool,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            default_colors: ColorPair::new(Color::White, Color::Blue),
            poll_interval: Duration::from_millis(20),
            tab_traversal: true,
            skip_obscured_windows: true,
            hide_idle_cursor: true,
        }
    }
}

impl ToolkitConfig {
    pub fn with_colors(mut self, colors: ColorPair) -> Self {
        self.default_colors = colors;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_tab_traversal(mut self, enabled: bool) -> Self {
        self.tab_traversal = enabled;
        self
    }

    pub fn with_obscured_skipping(mut self, enabled: bool) -> Self {
        self.skip_obscured_windows = enabled;
        self
    }
}
