//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`ProductCatalogue`],
//! [`SubscriptionAdmin`]) are what the HTTP layer calls. Driven ports
//! (`*Repository`) are what services call.

mod macros;
pub(crate) use macros::define_port_error;

mod directory_command;
mod directory_query;
mod directory_repository;
mod job_card_command;
mod job_command;
mod job_query;
mod job_repository;
mod product_catalogue;
mod product_repository;
mod subscription_admin;
mod subscription_repository;

#[cfg(test)]
pub use directory_command::MockDirectoryCommand;
pub use directory_command::DirectoryCommand;
#[cfg(test)]
pub use directory_query::MockDirectoryQuery;
pub use directory_query::DirectoryQuery;
#[cfg(test)]
pub use directory_repository::MockDirectoryRepository;
pub use directory_repository::{DirectoryRepository, DirectoryRepositoryError, DirectorySequence};
#[cfg(test)]
pub use job_card_command::MockJobCardCommand;
pub use job_card_command::JobCardCommand;
#[cfg(test)]
pub use job_command::MockJobCommand;
pub use job_command::{
    AssignJobRequest, CreateJobRequest, JobCommand, ReviewJobRequest, TimelineNoteRequest,
    TransitionJobRequest, UpdateJobRequest,
};
#[cfg(test)]
pub use job_query::MockJobQuery;
pub use job_query::JobQuery;
#[cfg(test)]
pub use job_repository::MockJobRepository;
pub use job_repository::{JobRepository, JobRepositoryError};
#[cfg(test)]
pub use product_catalogue::MockProductCatalogue;
pub use product_catalogue::ProductCatalogue;
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductRepository, ProductRepositoryError};
#[cfg(test)]
pub use subscription_admin::MockSubscriptionAdmin;
pub use subscription_admin::SubscriptionAdmin;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{
    SubscriptionRepository, SubscriptionRepositoryError, SubscriptionSequence,
};
