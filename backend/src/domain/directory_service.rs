//! Directory service implementing [`DirectoryCommand`] and [`DirectoryQuery`].
//!
//! Technician workloads are not stored; they are counted from the job
//! repository each time technicians are listed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{
    DirectoryCommand, DirectoryQuery, DirectoryRepository, DirectorySequence, JobRepository,
};
use super::service_support::{
    load_client, load_technician, map_directory_repository_error, map_job_repository_error,
    require_admin,
};
use super::{
    Actor, Client, ClientDraft, ClientId, DirectoryError, Error, Job, PrimaryStatus,
    PropertyDraft, PropertyId, Technician, TechnicianDraft, TechnicianId, TechnicianStatus,
    TechnicianUpdate, TechnicianView, TechnicianWorkload, filter_clients, filter_technicians,
};

/// Directory service.
#[derive(Clone)]
pub struct DirectoryService<D, J> {
    directory: Arc<D>,
    jobs: Arc<J>,
}

impl<D, J> DirectoryService<D, J> {
    /// Create a new service over the directory and job repositories.
    pub fn new(directory: Arc<D>, jobs: Arc<J>) -> Self {
        Self { directory, jobs }
    }
}

fn require_reader(actor: &Actor) -> Result<(), DirectoryError> {
    if actor.is_super_admin() {
        Err(DirectoryError::PermissionDenied(actor.to_string()))
    } else {
        Ok(())
    }
}

/// Count active and completed jobs per assigned technician.
fn workloads(jobs: &[Job]) -> HashMap<&TechnicianId, TechnicianWorkload> {
    let mut counts: HashMap<&TechnicianId, TechnicianWorkload> = HashMap::new();
    for job in jobs {
        let Some(technician) = job.assigned_technician() else {
            continue;
        };
        let entry = counts.entry(&technician.id).or_default();
        if job.status().is_active() {
            entry.active_jobs += 1;
        } else if job.status().primary() == PrimaryStatus::Completed {
            entry.completed_jobs += 1;
        }
    }
    counts
}

impl<D, J> DirectoryService<D, J>
where
    D: DirectoryRepository,
    J: JobRepository,
{
    async fn next_id(&self, sequence: DirectorySequence) -> Result<u64, Error> {
        self.directory
            .next_sequence(sequence)
            .await
            .map_err(map_directory_repository_error)
    }
}

#[async_trait]
impl<D, J> DirectoryCommand for DirectoryService<D, J>
where
    D: DirectoryRepository,
    J: JobRepository,
{
    async fn create_client(&self, actor: &Actor, draft: ClientDraft) -> Result<Client, Error> {
        require_admin(actor)?;
        let id = ClientId::from_sequence(self.next_id(DirectorySequence::Client).await?);
        let client = Client::new(id, draft)?;
        self.directory
            .save_client(&client)
            .await
            .map_err(map_directory_repository_error)?;
        info!(client_id = %client.id, "client created");
        Ok(client)
    }

    async fn add_property(
        &self,
        actor: &Actor,
        client_id: &ClientId,
        draft: PropertyDraft,
    ) -> Result<Client, Error> {
        require_admin(actor)?;
        let mut client = load_client(self.directory.as_ref(), client_id).await?;
        let id = PropertyId::from_sequence(self.next_id(DirectorySequence::Property).await?);
        let property = client.add_property(id, draft)?;
        self.directory
            .save_client(&client)
            .await
            .map_err(map_directory_repository_error)?;
        info!(client_id = %client.id, property_id = %property.id, "property added");
        Ok(client)
    }

    async fn register_technician(
        &self,
        actor: &Actor,
        draft: TechnicianDraft,
    ) -> Result<Technician, Error> {
        require_admin(actor)?;
        let id = TechnicianId::from_sequence(self.next_id(DirectorySequence::Technician).await?);
        let technician = Technician::new(id, draft)?;
        self.directory
            .save_technician(&technician)
            .await
            .map_err(map_directory_repository_error)?;
        info!(technician_id = %technician.id, "technician registered");
        Ok(technician)
    }

    async fn update_technician(
        &self,
        actor: &Actor,
        technician_id: &TechnicianId,
        update: TechnicianUpdate,
    ) -> Result<Technician, Error> {
        require_admin(actor)?;
        let mut technician = load_technician(self.directory.as_ref(), technician_id).await?;
        technician.apply(update)?;
        self.directory
            .save_technician(&technician)
            .await
            .map_err(map_directory_repository_error)?;
        info!(
            technician_id = %technician.id,
            active = technician.status == TechnicianStatus::Active,
            "technician updated"
        );
        Ok(technician)
    }
}

#[async_trait]
impl<D, J> DirectoryQuery for DirectoryService<D, J>
where
    D: DirectoryRepository,
    J: JobRepository,
{
    async fn list_clients(
        &self,
        actor: &Actor,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Client>, Error> {
        require_reader(actor)?;
        let clients = self
            .directory
            .list_clients()
            .await
            .map_err(map_directory_repository_error)?;
        let matching: Vec<Client> = filter_clients(&clients, search.as_deref().unwrap_or(""))
            .into_iter()
            .cloned()
            .collect();
        Ok(Page::slice(matching, page))
    }

    async fn get_client(&self, actor: &Actor, client_id: &ClientId) -> Result<Client, Error> {
        require_reader(actor)?;
        load_client(self.directory.as_ref(), client_id).await
    }

    async fn list_technicians(
        &self,
        actor: &Actor,
        search: Option<String>,
        status: Option<TechnicianStatus>,
        page: PageRequest,
    ) -> Result<Page<TechnicianView>, Error> {
        require_reader(actor)?;
        let technicians = self
            .directory
            .list_technicians()
            .await
            .map_err(map_directory_repository_error)?;
        let jobs = self.jobs.list().await.map_err(map_job_repository_error)?;
        let counts = workloads(&jobs);
        let views: Vec<TechnicianView> = technicians
            .into_iter()
            .map(|technician| {
                let workload = counts.get(&technician.id).copied().unwrap_or_default();
                TechnicianView {
                    technician,
                    workload,
                }
            })
            .collect();
        let matching: Vec<TechnicianView> =
            filter_technicians(&views, search.as_deref().unwrap_or(""), status)
                .into_iter()
                .cloned()
                .collect();
        Ok(Page::slice(matching, page))
    }
}

#[cfg(test)]
#[path = "directory_service_tests.rs"]
mod tests;
