//! Driven port for the client and technician directory.

use async_trait::async_trait;

use crate::domain::{Client, ClientId, Technician, TechnicianId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by directory repository adapters.
    pub enum DirectoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "directory repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "directory repository query failed: {message}",
    }
}

/// Sequence used when issuing directory identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectorySequence {
    /// `CLIENT-NNN`.
    Client,
    /// `PROP-NNN`.
    Property,
    /// `TECH-NNN`.
    Technician,
}

/// Read-mostly storage for clients and technicians.
///
/// `save_*` methods insert or replace by id; lists keep insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Reserve the next number in `sequence`.
    async fn next_sequence(
        &self,
        sequence: DirectorySequence,
    ) -> Result<u64, DirectoryRepositoryError>;

    /// All clients.
    async fn list_clients(&self) -> Result<Vec<Client>, DirectoryRepositoryError>;

    /// Fetch a client with its properties.
    async fn find_client(&self, id: &ClientId) -> Result<Option<Client>, DirectoryRepositoryError>;

    /// Insert or replace a client.
    async fn save_client(&self, client: &Client) -> Result<(), DirectoryRepositoryError>;

    /// All technicians.
    async fn list_technicians(&self) -> Result<Vec<Technician>, DirectoryRepositoryError>;

    /// Fetch a technician.
    async fn find_technician(
        &self,
        id: &TechnicianId,
    ) -> Result<Option<Technician>, DirectoryRepositoryError>;

    /// Insert or replace a technician.
    async fn save_technician(&self, technician: &Technician)
    -> Result<(), DirectoryRepositoryError>;
}
