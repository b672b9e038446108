//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the driving ports and remain testable without I/O.

use std::sync::Arc;

use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::domain::ports::{
    DirectoryCommand, DirectoryQuery, JobCardCommand, JobCommand, JobQuery, ProductCatalogue,
    SubscriptionAdmin,
};

/// Page sizes applied to list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingSettings {
    /// Size used when the request omits `pageSize`.
    pub default_page_size: usize,
    /// Largest accepted `pageSize`.
    pub max_page_size: usize,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Parameter object bundling the driving ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub jobs: Arc<dyn JobCommand>,
    pub jobs_query: Arc<dyn JobQuery>,
    pub job_cards: Arc<dyn JobCardCommand>,
    pub directory: Arc<dyn DirectoryCommand>,
    pub directory_query: Arc<dyn DirectoryQuery>,
    pub subscriptions: Arc<dyn SubscriptionAdmin>,
    pub products: Arc<dyn ProductCatalogue>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub jobs: Arc<dyn JobCommand>,
    pub jobs_query: Arc<dyn JobQuery>,
    pub job_cards: Arc<dyn JobCardCommand>,
    pub directory: Arc<dyn DirectoryCommand>,
    pub directory_query: Arc<dyn DirectoryQuery>,
    pub subscriptions: Arc<dyn SubscriptionAdmin>,
    pub products: Arc<dyn ProductCatalogue>,
    pub paging: PagingSettings,
}

impl HttpState {
    /// Construct state with the default page sizes.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_paging(ports, PagingSettings::default())
    }

    /// Construct state with explicit page sizes.
    pub fn with_paging(ports: HttpStatePorts, paging: PagingSettings) -> Self {
        let HttpStatePorts {
            jobs,
            jobs_query,
            job_cards,
            directory,
            directory_query,
            subscriptions,
            products,
        } = ports;
        Self {
            jobs,
            jobs_query,
            job_cards,
            directory,
            directory_query,
            subscriptions,
            products,
            paging,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
