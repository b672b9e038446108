//! In-memory client and technician directory.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::upsert;

use crate::domain::ports::{DirectoryRepository, DirectoryRepositoryError, DirectorySequence};
use crate::domain::{Client, ClientId, Technician, TechnicianId};

#[derive(Debug, Default)]
struct DirectoryStore {
    sequences: HashMap<DirectorySequence, u64>,
    clients: Vec<Client>,
    technicians: Vec<Technician>,
}

/// Directory behind a read/write lock; lists keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryRepository {
    store: RwLock<DirectoryStore>,
}

impl InMemoryDirectoryRepository {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DirectoryStore>, DirectoryRepositoryError> {
        self.store
            .read()
            .map_err(|_| DirectoryRepositoryError::query("directory lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DirectoryStore>, DirectoryRepositoryError> {
        self.store
            .write()
            .map_err(|_| DirectoryRepositoryError::query("directory lock poisoned"))
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn next_sequence(
        &self,
        sequence: DirectorySequence,
    ) -> Result<u64, DirectoryRepositoryError> {
        let mut store = self.write()?;
        let counter = store.sequences.entry(sequence).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DirectoryRepositoryError> {
        Ok(self.read()?.clients.clone())
    }

    async fn find_client(&self, id: &ClientId) -> Result<Option<Client>, DirectoryRepositoryError> {
        Ok(self
            .read()?
            .clients
            .iter()
            .find(|client| &client.id == id)
            .cloned())
    }

    async fn save_client(&self, client: &Client) -> Result<(), DirectoryRepositoryError> {
        upsert(&mut self.write()?.clients, client, |c| &c.id);
        Ok(())
    }

    async fn list_technicians(&self) -> Result<Vec<Technician>, DirectoryRepositoryError> {
        Ok(self.read()?.technicians.clone())
    }

    async fn find_technician(
        &self,
        id: &TechnicianId,
    ) -> Result<Option<Technician>, DirectoryRepositoryError> {
        Ok(self
            .read()?
            .technicians
            .iter()
            .find(|technician| &technician.id == id)
            .cloned())
    }

    async fn save_technician(
        &self,
        technician: &Technician,
    ) -> Result<(), DirectoryRepositoryError> {
        upsert(&mut self.write()?.technicians, technician, |t| &t.id);
        Ok(())
    }
}
