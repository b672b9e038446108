//! Clients, their properties, and the technician roster.

mod client;
mod selection;
mod technician;

use serde_json::json;

pub use client::{Client, ClientDraft, Property, PropertyDraft, filter_clients};
pub use selection::SiteSelection;
pub use technician::{
    Technician, TechnicianDraft, TechnicianStatus, TechnicianUpdate, TechnicianView,
    TechnicianWorkload, filter_technicians,
};

use super::failure::{DomainFailure, FailureKind};
use super::identifier::string_identifier;

string_identifier!(
    /// Client identifier.
    ClientId, prefix = "CLIENT"
);

string_identifier!(
    /// Property identifier, unique across all clients.
    PropertyId, prefix = "PROP"
);

string_identifier!(
    /// Technician identifier.
    TechnicianId, prefix = "TECH"
);

/// Failures raised by directory rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// No client has the identifier.
    #[error("client {0} not found")]
    ClientNotFound(ClientId),
    /// The property is not listed under the client.
    #[error("property {property} does not belong to client {client}")]
    PropertyNotFound {
        /// Client that was searched.
        client: ClientId,
        /// Property that was requested.
        property: PropertyId,
    },
    /// No technician has the identifier.
    #[error("technician {0} not found")]
    TechnicianNotFound(TechnicianId),
    /// A property name is already used by the client.
    #[error("client {client} already has a property named {name:?}")]
    DuplicateProperty {
        /// Owning client.
        client: ClientId,
        /// Conflicting name.
        name: String,
    },
    /// A supplied value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// The actor may not manage the directory.
    #[error("{0} may not manage the directory")]
    PermissionDenied(String),
}

impl DirectoryError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl DomainFailure for DirectoryError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::ClientNotFound(_)
            | Self::PropertyNotFound { .. }
            | Self::TechnicianNotFound(_) => FailureKind::NotFound,
            Self::DuplicateProperty { .. } | Self::InvalidInput { .. } => FailureKind::InvalidInput,
            Self::PermissionDenied(_) => FailureKind::PermissionDenied,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::ClientNotFound(_) => "client_not_found",
            Self::PropertyNotFound { .. } => "property_not_found",
            Self::TechnicianNotFound(_) => "technician_not_found",
            Self::DuplicateProperty { .. } => "duplicate_property",
            Self::InvalidInput { .. } => "invalid_input",
            Self::PermissionDenied(_) => "permission_denied",
        }
    }

    fn detail_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        if let Self::InvalidInput { field, .. } = self {
            fields.insert("field".to_owned(), json!(field));
        }
        fields
    }
}

impl From<DirectoryError> for super::Error {
    fn from(value: DirectoryError) -> Self {
        super::failure::to_api_error(&value)
    }
}

/// Trim `value`, rejecting blank input.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, DirectoryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DirectoryError::invalid(field, "must not be blank"));
    }
    Ok(trimmed.to_owned())
}

/// Trim an email address and check it has the `local@domain` shape.
pub(crate) fn email_address(field: &'static str, value: &str) -> Result<String, DirectoryError> {
    let email = required_text(field, value)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(DirectoryError::invalid(field, "must be an email address")),
    }
}
