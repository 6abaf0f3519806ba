//! Tests for error classification.

use super::*;

fn service_error(code: ServiceErrorCode, status: u16) -> MnsError {
    MnsError::Service(ServiceError {
        code,
        message: "test".to_string(),
        request_id: Some("req-1".to_string()),
        status,
    })
}

#[test]
fn test_transport_errors_are_transient() {
    let error = MnsError::Transport {
        message: "connection reset".to_string(),
    };
    assert!(error.is_transient());
    assert!(error.should_retry());

    let error = MnsError::Timeout { seconds: 30 };
    assert!(error.is_transient());
}

#[test]
fn test_parse_errors_are_not_transient() {
    let error = MnsError::Parse {
        message: "bad xml".to_string(),
    };
    assert!(!error.is_transient());
    assert!(error.retry_after().is_none());
}

#[test]
fn test_validation_errors_are_not_transient() {
    let error = MnsError::InvalidArgument {
        field: "queue_name".to_string(),
        message: "too long".to_string(),
    };
    assert!(!error.is_transient());
}

#[test]
fn test_service_error_classification() {
    assert!(service_error(ServiceErrorCode::Throttled, 503).is_transient());
    assert!(service_error(ServiceErrorCode::InternalError, 500).is_transient());

    assert!(!service_error(ServiceErrorCode::QueueAlreadyExists, 409).is_transient());
    assert!(!service_error(ServiceErrorCode::QueueNotExist, 404).is_transient());
    assert!(!service_error(ServiceErrorCode::MessageNotExist, 404).is_transient());
    assert!(!service_error(ServiceErrorCode::InvalidReceiptHandle, 400).is_transient());
    assert!(!service_error(ServiceErrorCode::AccessDenied, 403).is_transient());
    assert!(!service_error(ServiceErrorCode::Unrecognized("Odd".to_string()), 400).is_transient());
}

#[test]
fn test_throttled_suggests_retry_delay() {
    let error = service_error(ServiceErrorCode::Throttled, 503);
    assert!(error.retry_after().is_some());

    let error = service_error(ServiceErrorCode::AccessDenied, 403);
    assert!(error.retry_after().is_none());
}

#[test]
fn test_from_code_maps_known_codes() {
    assert_eq!(
        ServiceErrorCode::from_code("QueueAlreadyExist"),
        ServiceErrorCode::QueueAlreadyExists
    );
    assert_eq!(
        ServiceErrorCode::from_code("QueueNotExist"),
        ServiceErrorCode::QueueNotExist
    );
    assert_eq!(
        ServiceErrorCode::from_code("TopicAlreadyExist"),
        ServiceErrorCode::TopicAlreadyExists
    );
    assert_eq!(
        ServiceErrorCode::from_code("MessageNotExist"),
        ServiceErrorCode::MessageNotExist
    );
    assert_eq!(
        ServiceErrorCode::from_code("ReceiptHandleError"),
        ServiceErrorCode::InvalidReceiptHandle
    );
    assert_eq!(
        ServiceErrorCode::from_code("ReceiptHandleInvalid"),
        ServiceErrorCode::InvalidReceiptHandle
    );
    assert_eq!(
        ServiceErrorCode::from_code("SubscriptionNotExist"),
        ServiceErrorCode::SubscriptionNotExist
    );
}

#[test]
fn test_from_code_preserves_unknown_codes() {
    let code = ServiceErrorCode::from_code("SomethingNew");
    assert_eq!(code, ServiceErrorCode::Unrecognized("SomethingNew".to_string()));
    assert_eq!(code.to_string(), "SomethingNew");
}

#[test]
fn test_code_display_round_trips() {
    for wire in [
        "QueueAlreadyExist",
        "QueueNotExist",
        "TopicAlreadyExist",
        "TopicNotExist",
        "SubscriptionAlreadyExist",
        "SubscriptionNotExist",
        "MessageNotExist",
        "InvalidArgument",
        "AccessDenied",
        "Throttled",
        "InternalError",
    ] {
        assert_eq!(ServiceErrorCode::from_code(wire).to_string(), wire);
    }
}

#[test]
fn test_service_error_display_includes_code_and_status() {
    let error = service_error(ServiceErrorCode::QueueNotExist, 404);
    let rendered = error.to_string();
    assert!(rendered.contains("QueueNotExist"));
    assert!(rendered.contains("404"));
}

#[test]
fn test_parse_and_service_errors_are_distinct() {
    let parse = MnsError::Parse {
        message: "garbage".to_string(),
    };
    let service = service_error(ServiceErrorCode::InternalError, 500);

    assert!(matches!(parse, MnsError::Parse { .. }));
    assert!(matches!(service, MnsError::Service(_)));
}

#[test]
fn test_errors_are_cloneable_for_promise_storage() {
    let error = service_error(ServiceErrorCode::Throttled, 503);
    let copy = error.clone();
    assert_eq!(copy.to_string(), error.to_string());
}
