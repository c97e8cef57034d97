//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// One or more fields failed validation; see `details.fields`.
    #[schema(rename = "validation")]
    Validation,
    /// The requested beer does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A beer with the same identifier already exists.
    #[schema(rename = "conflict")]
    Conflict,
    /// Storage or currency conversion failed.
    #[schema(rename = "internal")]
    Internal,
}

/// OpenAPI schema for the `details` object of a validation error.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldErrorsSchema {
    /// Field name to the rule it violated, e.g. `"name": "max=30"`.
    #[schema(example = json!({"name": "required", "price": "min=0"}))]
    fields: BTreeMap<String, String>,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "validation")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "invalid request: name: required")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "6f1c2a9e-3d4b-4c5a-8e7f-0a1b2c3d4e5f")]
    trace_id: Option<String>,
    /// Field map for validation errors.
    details: Option<FieldErrorsSchema>,
}
