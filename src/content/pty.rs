//! PTY session backing command panels and the host program.
//!
//! A reader thread drains the master side into a shared inbox; the UI thread
//! feeds the inbox into a `vt100` parser on demand. Dropping a session kills
//! the child, which is how hiding a command panel releases its process.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use portable_pty::{Child, CommandBuilder, MasterPty, PtySize, native_pty_system};
use thiserror::Error;

const CURSOR_REPORT_QUERY: &[u8] = b"\x1b[6n";
const REPLAY_CAP: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum PtyError {
    #[error("pty {stage} failed: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PtyError {
    fn stage(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Stage {
            stage,
            message: err.to_string(),
        }
    }
}

pub type PtyResult<T> = Result<T, PtyError>;

#[derive(Default)]
struct Inbox {
    bytes: Mutex<Vec<u8>>,
    cursor_query: AtomicBool,
}

pub struct PtySession {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    inbox: Arc<Inbox>,
    replay: Vec<u8>,
    parser: vt100::Parser,
    size: PtySize,
    scrollback_len: usize,
    child: Option<Box<dyn Child + Send + Sync>>,
    _reader: JoinHandle<()>,
}

impl PtySession {
    pub fn spawn(command: CommandBuilder, size: PtySize, scrollback_len: usize) -> PtyResult<Self> {
        let pair = native_pty_system()
            .openpty(size)
            .map_err(|err| PtyError::stage("openpty", err))?;
        let child = pair
            .slave
            .spawn_command(command)
            .map_err(|err| PtyError::stage("spawn", err))?;
        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|err| PtyError::stage("clone reader", err))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|err| PtyError::stage("take writer", err))?;
        let inbox = Arc::new(Inbox::default());
        let reader_inbox = Arc::clone(&inbox);
        let reader_handle = thread::spawn(move || drain_into(reader, &reader_inbox));
        Ok(Self {
            master: pair.master,
            writer,
            inbox,
            replay: Vec::new(),
            parser: vt100::Parser::new(size.rows, size.cols, scrollback_len),
            size,
            scrollback_len,
            child: Some(child),
            _reader: reader_handle,
        })
    }

    pub fn size(&self) -> PtySize {
        self.size
    }

    /// Resize the PTY and rebuild the parser from the replay buffer so the
    /// screen reflows at the new geometry.
    pub fn resize(&mut self, size: PtySize) -> PtyResult<()> {
        if size.rows == 0 || size.cols == 0 || size == self.size {
            return Ok(());
        }
        self.master
            .resize(size)
            .map_err(|err| PtyError::stage("resize", err))?;
        self.size = size;
        let mut parser = vt100::Parser::new(size.rows, size.cols, self.scrollback_len);
        parser.process(&self.replay);
        self.parser = parser;
        Ok(())
    }

    pub fn write_bytes(&mut self, input: &[u8]) -> PtyResult<()> {
        self.writer.write_all(input)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Feed any output collected by the reader thread into the parser.
    pub fn update(&mut self) {
        let bytes = {
            let mut pending = self.inbox.bytes.lock().unwrap_or_else(|err| err.into_inner());
            if pending.is_empty() {
                return;
            }
            std::mem::take(&mut *pending)
        };
        self.replay.extend_from_slice(&bytes);
        trim_replay(&mut self.replay, REPLAY_CAP);
        self.parser.process(&bytes);
        if self.inbox.cursor_query.swap(false, Ordering::Relaxed) {
            let (row, col) = self.parser.screen().cursor_position();
            let report = format!("\x1b[{};{}R", row.saturating_add(1), col.saturating_add(1));
            if let Err(err) = self.write_bytes(report.as_bytes()) {
                tracing::debug!(%err, "cursor position report failed");
            }
        }
    }

    pub fn screen(&mut self) -> &vt100::Screen {
        self.update();
        self.parser.screen()
    }

    pub fn scrollback(&self) -> usize {
        self.parser.screen().scrollback()
    }

    pub fn set_scrollback(&mut self, rows: usize) {
        let rows = rows.min(self.scrollback_len);
        self.parser.screen_mut().set_scrollback(rows);
    }

    pub fn alternate_screen(&mut self) -> bool {
        self.screen().alternate_screen()
    }

    pub fn has_exited(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        match child.try_wait() {
            Ok(Some(_)) => {
                self.child = None;
                true
            }
            Ok(None) | Err(_) => false,
        }
    }

    pub fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                tracing::debug!(%err, "pty child kill failed");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        self.kill();
    }
}

fn drain_into(mut reader: Box<dyn Read + Send>, inbox: &Inbox) {
    // The last few bytes of the previous chunk, so a query split across reads
    // is still detected.
    let mut carry: Vec<u8> = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let chunk = &buf[..n];
        carry.extend_from_slice(chunk);
        if carry
            .windows(CURSOR_REPORT_QUERY.len())
            .any(|window| window == CURSOR_REPORT_QUERY)
        {
            inbox.cursor_query.store(true, Ordering::Relaxed);
        }
        let keep = CURSOR_REPORT_QUERY.len() - 1;
        if carry.len() > keep {
            carry.drain(..carry.len() - keep);
        }
        if let Ok(mut pending) = inbox.bytes.lock() {
            pending.extend_from_slice(chunk);
        }
    }
}

/// Drop the oldest half of `replay` once it exceeds `cap`, cutting at a line
/// boundary when one is close by.
fn trim_replay(replay: &mut Vec<u8>, cap: usize) {
    if replay.len() <= cap {
        return;
    }
    let cut = replay.len() - cap / 2;
    let window_end = (cut + 1024).min(replay.len());
    let at = replay[cut..window_end]
        .iter()
        .position(|b| *b == b'\n')
        .map(|offset| cut + offset + 1)
        .unwrap_or(cut);
    replay.drain(..at);
}
