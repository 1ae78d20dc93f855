//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_cancelled_display() {
    let err = Error::Cancelled;
    assert_eq!(format!("{}", err), "Lock acquisition cancelled");
}

#[test]
fn test_unsupported_display() {
    let err = Error::Unsupported("create_child_node on a flat graph".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Unsupported for this strategy"));
    assert!(display.contains("create_child_node on a flat graph"));
}

#[test]
fn test_invalid_argument_display() {
    let err = Error::InvalidArgument("stale node handle".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid argument"));
    assert!(display.contains("stale node handle"));
}

#[test]
fn test_consistency_violation_display() {
    let err = Error::ConsistencyViolation("re-entrant mutation".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Consistency violation"));
    assert!(display.contains("re-entrant mutation"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::Cancelled;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    assert!(format!("{:?}", Error::Cancelled).contains("Cancelled"));
    assert!(format!("{:?}", Error::Unsupported("x".into())).contains("Unsupported"));
    assert!(format!("{:?}", Error::InvalidArgument("x".into())).contains("InvalidArgument"));
    assert!(format!("{:?}", Error::ConsistencyViolation("x".into())).contains("ConsistencyViolation"));
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::InvalidArgument("res".to_string());
    assert_eq!(err.clone(), err);
    assert_ne!(Error::Cancelled, Error::Unsupported("res".to_string()));
}

#[test]
fn test_recoverable_classification() {
    assert!(Error::Cancelled.is_recoverable());
    assert!(Error::Unsupported("x".into()).is_recoverable());
    assert!(Error::InvalidArgument("x".into()).is_recoverable());
    assert!(!Error::ConsistencyViolation("x".into()).is_recoverable());
}

// ============================================================================
// RESULT TYPE TESTS
// ============================================================================

#[test]
fn test_result_type_err() {
    fn returns_error() -> Result<i32> {
        Err(Error::Cancelled)
    }

    match returns_error() {
        Err(e) => assert_eq!(e, Error::Cancelled),
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn test_result_question_mark_propagation() {
    fn inner() -> Result<()> {
        Err(Error::Unsupported("flat".to_string()))
    }

    fn outer() -> Result<u32> {
        inner()?;
        Ok(1)
    }

    assert_eq!(outer(), Err(Error::Unsupported("flat".to_string())));
}

#[test]
fn test_graph_err_macro_builds_variant() {
    let err = crate::graph_err!("galaxy3d::Test", InvalidArgument, "bad key {}", 7);
    assert_eq!(err, Error::InvalidArgument("bad key 7".to_string()));

    let err = crate::graph_err!("galaxy3d::Test", Cancelled);
    assert_eq!(err, Error::Cancelled);
}
