//! Driving port for directory reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Actor, Client, ClientId, Error, TechnicianStatus, TechnicianView};

/// Client and technician reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    /// Search and page clients.
    async fn list_clients(
        &self,
        actor: &Actor,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Client>, Error>;

    /// Fetch one client.
    async fn get_client(&self, actor: &Actor, client_id: &ClientId) -> Result<Client, Error>;

    /// Search and page technicians with freshly derived workloads.
    async fn list_technicians(
        &self,
        actor: &Actor,
        search: Option<String>,
        status: Option<TechnicianStatus>,
        page: PageRequest,
    ) -> Result<Page<TechnicianView>, Error>;
}
