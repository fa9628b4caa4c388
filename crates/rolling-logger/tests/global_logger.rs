//! Global logger lifecycle. Runs in its own test binary since `init_logger`
//! can only succeed once per process.

use rolling_logger::{error, info, init_logger, log_file_path, recent_lines, LoggerError};
use std::fs;

#[test]
fn test_init_then_helpers_write_to_active_file() {
    let dir = tempfile::tempdir().unwrap();
    init_logger(dir.path(), "buildco-admin").unwrap();

    let path = log_file_path().unwrap();
    assert_eq!(path, dir.path().join("buildco-admin.log"));

    info(&format!("Logging to {}", path.display())).unwrap();
    error("Store init failed: no such table").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("Logging to"), "{}", content);
    assert!(content.contains("Store init failed"), "{}", content);
    assert!(recent_lines().iter().any(|l| l.contains("Store init failed")));

    assert!(matches!(
        init_logger(dir.path(), "buildco-admin"),
        Err(LoggerError::AlreadyInitialized)
    ));
}
