//! Shared helpers for the domain services.

use serde_json::json;

use super::ports::{
    DirectoryRepositoryError, JobRepositoryError, ProductRepositoryError,
    SubscriptionRepositoryError,
};
use super::{
    Actor, Client, ClientId, DirectoryError, Error, Job, JobError, JobId, Technician,
    TechnicianId,
};
use super::ports::{DirectoryRepository, JobRepository};

pub(crate) fn map_job_repository_error(error: JobRepositoryError) -> Error {
    match error {
        JobRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("job repository unavailable: {message}"))
        }
        JobRepositoryError::Query { message } => {
            Error::internal(format!("job repository error: {message}"))
        }
        JobRepositoryError::Duplicate { id } => {
            Error::internal(format!("unexpected duplicate job {id}"))
        }
        JobRepositoryError::RevisionMismatch {
            id,
            expected,
            actual,
        } => Error::conflict(format!("{id} was modified concurrently; re-read and retry"))
            .with_details(json!({
                "expectedRevision": expected,
                "actualRevision": actual,
                "code": "revision_mismatch",
            })),
    }
}

pub(crate) fn map_directory_repository_error(error: DirectoryRepositoryError) -> Error {
    match error {
        DirectoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("directory repository unavailable: {message}"))
        }
        DirectoryRepositoryError::Query { message } => {
            Error::internal(format!("directory repository error: {message}"))
        }
    }
}

pub(crate) fn map_product_repository_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
    }
}

pub(crate) fn map_subscription_repository_error(error: SubscriptionRepositoryError) -> Error {
    match error {
        SubscriptionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("subscription repository unavailable: {message}"))
        }
        SubscriptionRepositoryError::Query { message } => {
            Error::internal(format!("subscription repository error: {message}"))
        }
    }
}

pub(crate) async fn load_job<J: JobRepository + ?Sized>(
    jobs: &J,
    id: &JobId,
) -> Result<Job, Error> {
    jobs.find(id)
        .await
        .map_err(map_job_repository_error)?
        .ok_or_else(|| JobError::JobNotFound(id.clone()).into())
}

pub(crate) async fn load_client<D: DirectoryRepository + ?Sized>(
    directory: &D,
    id: &ClientId,
) -> Result<Client, Error> {
    directory
        .find_client(id)
        .await
        .map_err(map_directory_repository_error)?
        .ok_or_else(|| DirectoryError::ClientNotFound(id.clone()).into())
}

pub(crate) async fn load_technician<D: DirectoryRepository + ?Sized>(
    directory: &D,
    id: &TechnicianId,
) -> Result<Technician, Error> {
    directory
        .find_technician(id)
        .await
        .map_err(map_directory_repository_error)?
        .ok_or_else(|| DirectoryError::TechnicianNotFound(id.clone()).into())
}

/// Reject actors that are not company admins.
pub(crate) fn require_admin(actor: &Actor) -> Result<(), DirectoryError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DirectoryError::PermissionDenied(actor.to_string()))
    }
}
