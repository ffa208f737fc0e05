//! JSONL file sink.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use super::{EventSink, SessionEvent};

#[derive(Serialize)]
struct LogLine<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a SessionEvent,
}

/// Appends one JSON object per line to a file.
///
/// If the file cannot be opened, or a later write fails, the logger keeps
/// going and counts the lost events instead.
#[derive(Debug)]
pub struct JsonlLogger {
    path: PathBuf,
    file: Option<File>,
    written: u64,
    dropped: u64,
}

impl JsonlLogger {
    /// Open (append) `path`, creating parent directories as needed.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let _ = fs::create_dir_all(parent);
        }
        let file = OpenOptions::new().create(true).append(true).open(path).ok();
        Self {
            path: path.to_path_buf(),
            file,
            written: 0,
            dropped: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the log file is currently accepting writes.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.file.is_some()
    }

    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    fn write_line(file: &mut File, event: &SessionEvent) -> std::io::Result<()> {
        let line = LogLine {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };
        let mut buf = serde_json::to_vec(&line)?;
        buf.push(b'\n');
        file.write_all(&buf)?;
        file.flush()
    }
}

impl EventSink for JsonlLogger {
    fn record(&mut self, event: &SessionEvent) {
        let Some(file) = self.file.as_mut() else {
            self.dropped += 1;
            return;
        };
        if Self::write_line(file, event).is_ok() {
            self.written += 1;
        } else {
            // Stop retrying a broken handle.
            self.file = None;
            self.dropped += 1;
        }
    }

    fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_object_per_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("events.jsonl");
        let mut logger = JsonlLogger::open(&path);
        assert!(logger.is_healthy());
        logger.record(&SessionEvent::TrialCommitted { result_index: 1 });
        logger.record(&SessionEvent::SessionCompleted { committed: 1 });
        assert_eq!(logger.written(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "trial_committed");
        assert_eq!(lines[0]["result_index"], 1);
        assert!(lines[1]["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn appends_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("events.jsonl");
        JsonlLogger::open(&path).record(&SessionEvent::SessionCompleted { committed: 0 });
        JsonlLogger::open(&path).record(&SessionEvent::SessionCompleted { committed: 0 });
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn unopenable_path_counts_dropped_events() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let mut logger = JsonlLogger::open(tmp.path());
        assert!(!logger.is_healthy());
        logger.record(&SessionEvent::SessionCompleted { committed: 0 });
        logger.record(&SessionEvent::SessionCompleted { committed: 0 });
        assert_eq!(logger.dropped(), 2);
        assert_eq!(logger.written(), 0);
    }
}
