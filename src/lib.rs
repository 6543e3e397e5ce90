//! term-overlay: a host program drawn full screen in the terminal with
//! draggable, lazily loaded panels floating above it.

pub mod app;
pub mod appearance;
pub mod chrome;
pub mod constants;
pub mod content;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod host;
pub mod keybindings;
pub mod overlay;
pub mod prefs;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod unlock;

pub use app::{App, Config};
pub use error::{ShellError, ShellResult};
