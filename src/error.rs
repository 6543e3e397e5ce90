use std::io;

use thiserror::Error;

use crate::content::ContentError;
use crate::content::pty::PtyError;
use crate::overlay::PanelId;
use crate::prefs::PrefsError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("panel id {0} is declared more than once")]
    DuplicatePanel(PanelId),
    #[error("unknown panel id {0}")]
    UnknownPanel(String),
    #[error("host application failed to start: {0}")]
    Host(#[from] PtyError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Prefs(#[from] PrefsError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ShellError> for io::Error {
    fn from(err: ShellError) -> Self {
        match err {
            ShellError::Io(err) => err,
            other => io::Error::other(other),
        }
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
