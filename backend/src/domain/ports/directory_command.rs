//! Driving port for directory edits. Admin only.

use async_trait::async_trait;

use crate::domain::{
    Actor, Client, ClientDraft, ClientId, Error, PropertyDraft, Technician, TechnicianDraft,
    TechnicianId, TechnicianUpdate,
};

/// Client and technician edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryCommand: Send + Sync {
    /// Create a client with no properties.
    async fn create_client(&self, actor: &Actor, draft: ClientDraft) -> Result<Client, Error>;

    /// Append a property to a client, returning the updated client.
    async fn add_property(
        &self,
        actor: &Actor,
        client_id: &ClientId,
        draft: PropertyDraft,
    ) -> Result<Client, Error>;

    /// Add an active technician.
    async fn register_technician(
        &self,
        actor: &Actor,
        draft: TechnicianDraft,
    ) -> Result<Technician, Error>;

    /// Change a technician's details.
    async fn update_technician(
        &self,
        actor: &Actor,
        technician_id: &TechnicianId,
        update: TechnicianUpdate,
    ) -> Result<Technician, Error>;
}
