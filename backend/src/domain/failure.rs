//! Classification of business-rule failures and their API mapping.
//!
//! Each aggregate raises its own `thiserror` enum. They all classify into a
//! [`FailureKind`] and a stable detail code, which is enough to build the
//! transport-agnostic [`Error`].

use serde_json::json;

use super::Error;

/// Category of a business-rule failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A referenced record does not exist.
    NotFound,
    /// The record is not in a state that allows the operation.
    InvalidTransition,
    /// Supplied values violate a validation rule.
    InvalidInput,
    /// The actor may not perform the operation.
    PermissionDenied,
}

/// Behaviour shared by aggregate error enums.
pub trait DomainFailure: std::error::Error {
    /// Failure category.
    fn kind(&self) -> FailureKind;

    /// Stable machine-readable code carried in error details.
    fn code(&self) -> &'static str;

    /// Extra detail fields merged alongside `code`.
    fn detail_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }
}

/// Convert a domain failure into an API error.
///
/// | kind | code |
/// |---|---|
/// | `NotFound` | `not_found` |
/// | `InvalidTransition` | `conflict` |
/// | `InvalidInput` | `invalid_request` |
/// | `PermissionDenied` | `forbidden` |
pub fn to_api_error<E: DomainFailure>(failure: &E) -> Error {
    let message = failure.to_string();
    let base = match failure.kind() {
        FailureKind::NotFound => Error::not_found(message),
        FailureKind::InvalidTransition => Error::conflict(message),
        FailureKind::InvalidInput => Error::invalid_request(message),
        FailureKind::PermissionDenied => Error::forbidden(message),
    };
    let mut details = failure.detail_fields();
    details.insert("code".to_owned(), json!(failure.code()));
    base.with_details(serde_json::Value::Object(details))
}
