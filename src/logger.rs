use crate::utils::preview;
use anyhow::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Longest reply slice written to the session log.
const REPLY_LOG_BYTES: usize = 200;

/// Appends timestamped lines to a per-session log file under `log_dir`.
pub struct Logger {
    log_file: PathBuf,
}

#[derive(Debug)]
pub struct SessionMetrics {
    pub total_dispatches: usize,
    pub successful_replies: usize,
    pub failed_dispatches: usize,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            total_dispatches: 0,
            successful_replies: 0,
            failed_dispatches: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_dispatches == 0 {
            return 0.0;
        }
        (self.successful_replies as f64 / self.total_dispatches as f64) * 100.0
    }

    pub fn display(&self) {
        use colored::Colorize;
        println!("\n{}", "━━━━━━━━━ Session Statistics ━━━━━━━━━".bright_cyan().bold());
        println!("Messages sent: {}", self.total_dispatches);
        println!("Replies received: {}", self.successful_replies.to_string().green());
        println!("Failed dispatches: {}", self.failed_dispatches.to_string().red());
        println!("Success rate: {:.1}%", self.success_rate());
        println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_cyan());
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new(log_dir: &str) -> Result<Self> {
        let dir = PathBuf::from(log_dir);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_file = dir.join(format!("session_{}.log", timestamp));

        Ok(Self { log_file })
    }

    pub fn log(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }

    pub fn log_dispatch(&self, session_id: &str, text: &str) -> Result<()> {
        self.log(&format!("DISPATCH [{}]: {}", session_id, text))
    }

    pub fn log_reply(&self, reply: &str) -> Result<()> {
        self.log(&format!("REPLY: {}", preview(reply, REPLY_LOG_BYTES)))
    }

    pub fn log_session_reset(&self, new_session_id: &str) -> Result<()> {
        self.log(&format!("SESSION RESET: {}", new_session_id))
    }

    pub fn log_error(&self, error: &str) -> Result<()> {
        self.log(&format!("ERROR: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_session_metrics_new() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.total_dispatches, 0);
        assert_eq!(metrics.successful_replies, 0);
        assert_eq!(metrics.failed_dispatches, 0);
    }

    #[test]
    fn test_success_rate_zero_dispatches() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.success_rate(), 0.0);
    }

    #[test]
    fn test_success_rate_calculation() {
        let mut metrics = SessionMetrics::new();
        metrics.total_dispatches = 10;
        metrics.successful_replies = 8;
        assert_eq!(metrics.success_rate(), 80.0);
    }

    #[test]
    fn test_success_rate_perfect() {
        let mut metrics = SessionMetrics::new();
        metrics.total_dispatches = 5;
        metrics.successful_replies = 5;
        assert_eq!(metrics.success_rate(), 100.0);
    }

    #[test]
    fn test_logger_creation() {
        let test_log_dir = "test_logs_temp_cr1";
        let logger = Logger::new(test_log_dir);
        assert!(logger.is_ok());

        let logger = logger.unwrap();
        // Check that the parent directory exists
        assert!(logger.log_file.parent().unwrap().exists());

        let _ = fs::remove_dir_all(test_log_dir);
    }

    #[test]
    fn test_logger_basic_log() {
        let test_log_dir = "test_logs_temp_cr2";
        let logger = Logger::new(test_log_dir).unwrap();

        let result = logger.log("Test message");
        assert!(result.is_ok());

        let content = fs::read_to_string(&logger.log_file).unwrap();
        assert!(content.contains("Test message"));

        let _ = fs::remove_dir_all(test_log_dir);
    }

    #[test]
    fn test_logger_dispatch_entry() {
        let test_log_dir = "test_logs_temp_cr3";
        let logger = Logger::new(test_log_dir).unwrap();

        let result = logger.log_dispatch("session-1", "hello webhook");
        assert!(result.is_ok());

        let content = fs::read_to_string(&logger.log_file).unwrap();
        assert!(content.contains("DISPATCH"));
        assert!(content.contains("session-1"));
        assert!(content.contains("hello webhook"));

        let _ = fs::remove_dir_all(test_log_dir);
    }

    #[test]
    fn test_logger_reply_truncated() {
        let test_log_dir = "test_logs_temp_cr4";
        let logger = Logger::new(test_log_dir).unwrap();

        let long_reply = "x".repeat(500);
        logger.log_reply(&long_reply).unwrap();

        let content = fs::read_to_string(&logger.log_file).unwrap();
        assert!(content.contains("REPLY"));
        assert!(content.contains("..."));
        assert!(!content.contains(&long_reply));

        let _ = fs::remove_dir_all(test_log_dir);
    }

    #[test]
    fn test_logger_multiple_entries() {
        let test_log_dir = "test_logs_temp_cr5";
        let logger = Logger::new(test_log_dir).unwrap();

        let _ = logger.log("Entry 1");
        let _ = logger.log("Entry 2");
        let _ = logger.log("Entry 3");

        let content = fs::read_to_string(&logger.log_file).unwrap();
        assert!(content.contains("Entry 1"));
        assert!(content.contains("Entry 2"));
        assert!(content.contains("Entry 3"));

        let _ = fs::remove_dir_all(test_log_dir);
    }
}
