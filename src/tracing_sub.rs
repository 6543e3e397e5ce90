use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::content::event_log::{self, EventLogWriter};

pub struct DelegatingWriter {
    inner: DelegatingInner,
    tee: Option<Arc<Mutex<File>>>,
}

enum DelegatingInner {
    EventLog(EventLogWriter),
    Stderr(io::Stderr),
}

impl DelegatingWriter {
    fn new(tee: Option<Arc<Mutex<File>>>) -> Self {
        let inner = match event_log::global() {
            Some(handle) => DelegatingInner::EventLog(handle.writer()),
            None => DelegatingInner::Stderr(io::stderr()),
        };
        Self { inner, tee }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = &self.tee
            && let Ok(mut file) = file.lock()
        {
            // A failing log file must not take the event log down with it.
            let _ = file.write_all(buf);
        }
        match &mut self.inner {
            DelegatingInner::EventLog(w) => w.write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = &self.tee
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
        match &mut self.inner {
            DelegatingInner::EventLog(w) => w.flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SubscriberMakeWriter {
    tee: Option<Arc<Mutex<File>>>,
}

impl SubscriberMakeWriter {
    pub fn with_log_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            tee: Some(Arc::new(Mutex::new(file))),
        })
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new(self.tee.clone())
    }
}

/// Install the global subscriber. Output goes to the event log when one is
/// installed (stderr otherwise) and is also appended to `log_file` when
/// given. Later calls are no-ops.
pub fn init_default(log_file: Option<&Path>) -> io::Result<()> {
    let writer = match log_file {
        Some(path) => SubscriberMakeWriter::with_log_file(path)?,
        None => SubscriberMakeWriter::default(),
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn log_file_receives_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.log");
        let make = SubscriberMakeWriter::with_log_file(&path).unwrap();
        let mut writer = make.make_writer();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();
        drop(writer);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
