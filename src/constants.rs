//! Shared crate-wide constants.

use std::time::Duration;

/// Rows occupied by the shell title bar at the top of the viewport.
pub const TITLEBAR_HEIGHT: u16 = 1;

/// Rows occupied by the toolbar directly below the title bar.
pub const TOOLBAR_HEIGHT: u16 = 1;

/// Cells kept free between a panel and every viewport edge.
pub const PANEL_BORDER_MARGIN: i32 = 1;

/// Quiet period before a viewport size change is propagated to the host
/// program's PTY. Panel reclamping does not wait for it.
pub const HOST_RESIZE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Upper bound on how long the event loop blocks waiting for input before it
/// polls PTYs and pending debounces.
pub const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Lines retained by the in-memory event log.
pub const EVENT_LOG_MAX_LINES: usize = 2000;

/// Scrollback rows kept by PTY-backed views.
pub const TERMINAL_SCROLLBACK_LEN: usize = 1000;
