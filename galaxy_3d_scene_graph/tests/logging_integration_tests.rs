//! Integration tests for the scene graph logging system
//!
//! These tests swap the process-wide logger and check what graph
//! operations report through it.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_scene_graph::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use galaxy_3d_scene_graph::galaxy3d::scene::{RegionConfig, SceneNode};
use galaxy_3d_scene_graph::galaxy3d::sync::InterruptHandle;
use galaxy_3d_scene_graph::galaxy3d::{Error, SpatialGraph};
use galaxy_3d_scene_graph::log;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install() -> Arc<Mutex<Vec<LogEntry>>> {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);
    log::set_min_severity(LogSeverity::Info);
    entries
}

fn restore() {
    log::reset_logger();
    log::set_min_severity(LogSeverity::Info);
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let entries = install();

    log::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    log::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());
    log::log_detailed(LogSeverity::Error, "test::module", "Test error message".to_string(), "test_file.rs", 42);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[1].message, "Test warning message");
        assert_eq!(captured[2].file, Some("test_file.rs"));
        assert_eq!(captured[2].line, Some(42));
    }

    restore();
}

#[test]
#[serial]
fn test_integration_graph_creation_is_logged() {
    let entries = install();

    let _graph = SpatialGraph::octree(RegionConfig::default());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].source, "galaxy3d::SpatialGraph");
        assert!(captured[0].message.contains("Octree"));
    }

    restore();
}

#[test]
#[serial]
fn test_integration_invalid_argument_logs_error_with_location() {
    let graph = SpatialGraph::flat();
    let other = SpatialGraph::flat();
    let foreign = other.add(SceneNode::with_name("foreign")).unwrap();
    let entries = install();

    let result = graph.remove(&foreign);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let entry = &captured[0];
        assert_eq!(entry.severity, LogSeverity::Error);
        assert_eq!(entry.source, "galaxy3d::SpatialGraph");
        assert!(entry.file.is_some());
        assert!(entry.line.is_some());
        if let Err(Error::InvalidArgument(message)) = result {
            assert_eq!(entry.message, message);
        }
    }

    restore();
}

#[test]
#[serial]
fn test_integration_unsupported_strategy_operation_is_logged() {
    let graph = SpatialGraph::flat();
    let entries = install();

    assert!(matches!(graph.create_child_node(), Err(Error::Unsupported(_))));

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Error);
        assert_eq!(captured[0].source, "galaxy3d::FlatSceneIndex");
    }

    restore();
}

#[test]
#[serial]
fn test_integration_cancellation_logs_warning() {
    let graph = SpatialGraph::flat();
    let guard = graph.acquire_write_lock().unwrap();
    let entries = install();

    std::thread::scope(|scope| {
        let graph = &graph;
        let waiter = scope.spawn(move || {
            InterruptHandle::current().interrupt();
            graph.acquire_write_lock().map(drop)
        });
        assert!(matches!(waiter.join().unwrap(), Err(Error::Cancelled)));
    });
    drop(guard);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Warn);
        assert_eq!(captured[0].source, "galaxy3d::GraphLock");
    }

    restore();
}

#[test]
#[serial]
fn test_integration_min_severity_filters_entries() {
    let entries = install();
    log::set_min_severity(LogSeverity::Warn);

    log::log(LogSeverity::Info, "test", "dropped".to_string());
    log::log(LogSeverity::Warn, "test", "kept".to_string());
    let _graph = SpatialGraph::flat();

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].message, "kept");
    }

    restore();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let entries = install();

    log::log(LogSeverity::Info, "test", "Message 1".to_string());
    restore();
    log::log(LogSeverity::Info, "test", "Message 2".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
}
