//! Embedded panel content.
//!
//! A panel's content is instantiated lazily from its [`ContentSource`] the
//! first time the panel is shown and dropped when the panel is hidden.
//! Dropping a content instance releases whatever it holds (a PTY child, a
//! parsed document), which is what bounds resident content to the number of
//! visible panels.

pub mod document;
pub mod event_log;
pub mod pty;
pub mod terminal;

use std::fmt;
use std::path::{Component as PathComponent, Path, PathBuf};

use crossterm::event::Event;
use portable_pty::PtySize;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use thiserror::Error;

use crate::ui::UiFrame;

pub use document::DocumentView;
pub use event_log::{EventLogHandle, EventLogView};
pub use terminal::{TerminalView, default_shell_command};

/// Context passed to content while rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentContext {
    focused: bool,
}

impl ContentContext {
    pub const fn new(focused: bool) -> Self {
        Self { focused }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }
}

pub trait PanelContent {
    fn resize(&mut self, _area: Rect) {}

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ContentContext);

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }

    /// True once the content has nothing more to show, e.g. its process exited.
    fn finished(&mut self) -> bool {
        false
    }
}

/// Static address of a panel's content, fixed when the panel is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Markdown document, relative to the asset root.
    Document(PathBuf),
    /// Command line run inside a PTY.
    Command(String),
    /// The shell's own event log.
    EventLog,
}

impl ContentSource {
    pub fn document(path: impl Into<PathBuf>) -> Self {
        Self::Document(path.into())
    }

    pub fn command(line: impl Into<String>) -> Self {
        Self::Command(line.into())
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(path) => write!(f, "{}", path.display()),
            Self::Command(line) => write!(f, "cmd:{line}"),
            Self::EventLog => write!(f, "log:events"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content address {0} must be a relative path inside the asset root")]
    NotRelative(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid command line {line:?}: {source}")]
    CommandLine {
        line: String,
        #[source]
        source: shell_words::ParseError,
    },
    #[error("empty command line")]
    EmptyCommand,
    #[error("failed to spawn {command:?}: {message}")]
    Spawn { command: String, message: String },
    #[error("event log is not installed")]
    EventLogUnavailable,
}

/// Instantiates content for a panel. Every call must produce a fresh
/// instance; panels never reuse content across a hide.
pub trait ContentLoader {
    fn load(
        &mut self,
        source: &ContentSource,
        area: Rect,
    ) -> Result<Box<dyn PanelContent>, ContentError>;
}

/// Production loader: documents come from an asset directory, commands run in
/// a PTY and the event log reads the tracing ring buffer.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
    event_log: Option<EventLogHandle>,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            event_log: None,
        }
    }

    pub fn with_event_log(mut self, handle: EventLogHandle) -> Self {
        self.event_log = Some(handle);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &Path) -> Result<PathBuf, ContentError> {
        let escapes = relative.components().any(|part| {
            matches!(
                part,
                PathComponent::ParentDir | PathComponent::RootDir | PathComponent::Prefix(_)
            )
        });
        if escapes || relative.as_os_str().is_empty() {
            return Err(ContentError::NotRelative(relative.to_path_buf()));
        }
        Ok(self.root.join(relative))
    }
}

impl ContentLoader for AssetLoader {
    fn load(
        &mut self,
        source: &ContentSource,
        area: Rect,
    ) -> Result<Box<dyn PanelContent>, ContentError> {
        match source {
            ContentSource::Document(relative) => {
                let path = self.resolve(relative)?;
                let raw = std::fs::read_to_string(&path)
                    .map_err(|source| ContentError::Read { path, source })?;
                Ok(Box::new(DocumentView::from_markdown(&raw)))
            }
            ContentSource::Command(line) => {
                let words = shell_words::split(line).map_err(|source| ContentError::CommandLine {
                    line: line.clone(),
                    source,
                })?;
                let Some((program, args)) = words.split_first() else {
                    return Err(ContentError::EmptyCommand);
                };
                let mut command = portable_pty::CommandBuilder::new(program);
                command.args(args);
                if let Ok(cwd) = std::env::current_dir() {
                    command.cwd(cwd);
                }
                let size = PtySize {
                    rows: area.height.max(1),
                    cols: area.width.max(1),
                    pixel_width: 0,
                    pixel_height: 0,
                };
                let view = TerminalView::spawn(command, size).map_err(|err| ContentError::Spawn {
                    command: line.clone(),
                    message: err.to_string(),
                })?;
                Ok(Box::new(view))
            }
            ContentSource::EventLog => {
                let handle = self
                    .event_log
                    .clone()
                    .ok_or(ContentError::EventLogUnavailable)?;
                Ok(Box::new(EventLogView::new(handle)))
            }
        }
    }
}

/// Placeholder installed when a source fails to load, so the panel still
/// opens with a non-empty content container.
#[derive(Debug)]
pub struct UnavailableView {
    address: String,
}

impl UnavailableView {
    pub fn new(source: &ContentSource) -> Self {
        Self {
            address: source.to_string(),
        }
    }
}

impl PanelContent for UnavailableView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ContentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = Style::default().add_modifier(Modifier::DIM);
        frame.set_string(area.x, area.y, &format!("unavailable: {}", self.address), style);
    }
}
