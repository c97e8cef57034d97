//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("beer repository error: connection refused")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn validation_error_case(expected_trace_id: String) -> Error {
    Error::invalid_field("name", "required").with_trace_id(expected_trace_id)
}

#[rstest]
#[case::validation(Error::invalid_field("price", "min=0"), StatusCode::BAD_REQUEST)]
#[case::not_found(Error::not_found("beer 9 not found"), StatusCode::NOT_FOUND)]
#[case::conflict(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case::internal(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn error_responses_include_trace_id_and_payloads(
    #[from(internal_error_case)] internal_error: Error,
    #[from(validation_error_case)] validation_error: Error,
    expected_trace_id: String,
) {
    let redacted = assert_error_response(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(redacted.code(), ErrorCode::Internal);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());

    let payload = assert_error_response(
        validation_error,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::Validation);
    assert_eq!(
        payload.details(),
        Some(&json!({"fields": {"name": "required"}}))
    );
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::conflict("An element with the same id already exists.");

    let payload = assert_error_response(error, StatusCode::CONFLICT, None).await;
    assert_eq!(payload.code(), ErrorCode::Conflict);
    assert_eq!(
        payload.message(),
        "An element with the same id already exists."
    );
    assert_eq!(payload.trace_id(), None);
}

#[rstest]
fn actix_errors_are_promoted_to_redacted_internal() {
    let actix = actix_web::error::ErrorBadGateway("upstream exploded");
    let promoted = Error::from(actix);
    assert_eq!(promoted.code(), ErrorCode::Internal);
    assert_eq!(promoted.message(), "Internal server error");
}

#[rstest]
#[case::missing("missing field `name` at line 1 column 2", Some("name"))]
#[case::unknown("unknown field `colour`, expected one of `id`", Some("colour"))]
#[case::no_field("invalid type: string \"x\", expected i64", None)]
#[case::quoted_value("invalid type: integer `2`, expected a string", None)]
#[case::empty("missing field ``", None)]
fn extracts_field_names_from_serde_messages(
    #[case] message: &str,
    #[case] expected: Option<&str>,
) {
    assert_eq!(field_in_message(message), expected);
}

#[rstest]
#[case::missing_field(r#"{"id":1}"#, "brewery", "required")]
#[case::wrong_type(r#"{"id":"one"}"#, "body", "type")]
fn json_decoding_failures_become_field_errors(
    #[case] body: &str,
    #[case] field: &str,
    #[case] rule: &str,
) {
    #[derive(Debug, serde::Deserialize)]
    #[expect(dead_code, reason = "decoded only to provoke serde errors")]
    struct BeerShape {
        id: i64,
        brewery: String,
    }

    let source = serde_json::from_str::<BeerShape>(body).expect_err("payload is invalid");
    let request = TestRequest::default().to_http_request();
    let error = json_error_handler(JsonPayloadError::Deserialize(source), &request);
    let response = error.error_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let domain = error
        .as_error::<Error>()
        .expect("handler wraps a domain error");
    assert_eq!(domain.code(), ErrorCode::Validation);
    assert_eq!(
        domain.field_errors().and_then(|fields| fields.get(field).cloned()),
        Some(rule.to_owned())
    );
}

#[rstest]
fn syntax_errors_are_reported_against_the_body() {
    let source = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated JSON");
    let request = TestRequest::default().to_http_request();
    let error = json_error_handler(JsonPayloadError::Deserialize(source), &request);
    let domain = error.as_error::<Error>().expect("domain error");
    assert_eq!(
        domain.field_errors().and_then(|fields| fields.get("body").cloned()),
        Some("json".to_owned())
    );
}
