use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_FILE: &str = "events.log";

// Logging must never take the app down; write failures are swallowed.
#[derive(Debug)]
pub struct EventLog {
    logs_dir: PathBuf,
    guard: Mutex<()>,
}

impl EventLog {
    pub fn new(logs_dir: impl AsRef<Path>) -> Self {
        Self {
            logs_dir: logs_dir.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    pub fn info(&self, operation: &str, message: &str) {
        self.append("info", operation, message);
    }

    pub fn warn(&self, operation: &str, message: &str) {
        self.append("warn", operation, message);
    }

    pub fn error(&self, operation: &str, message: &str) {
        self.append("error", operation, message);
    }

    fn append(&self, level: &str, operation: &str, message: &str) {
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        let path = self.logs_dir.join(LOG_FILE);
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "operation": operation,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn append_writes_json_lines() {
        let dir = std::env::temp_dir().join(format!(
            "ezgrades-event-log-test-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create log dir");

        let log = EventLog::new(&dir);
        log.info("refetch", "loaded 3 tasks");
        log.warn("fallback", "tasks: network unreachable");

        let raw = fs::read_to_string(dir.join(LOG_FILE)).expect("read log file");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).expect("json line");
            assert!(parsed.get("timestamp").is_some());
            assert!(parsed.get("operation").is_some());
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_logs_dir_is_ignored() {
        let log = EventLog::new("/nonexistent/ezgrades-logs");
        log.error("refetch", "this write silently fails");
    }
}
