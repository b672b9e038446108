//! In-memory adapters for the driven repository ports.
//!
//! Each store keeps its records in insertion order behind a standard lock
//! that is never held across an `.await`.

mod directory;
mod jobs;
mod products;
mod subscriptions;

pub use directory::InMemoryDirectoryRepository;
pub use jobs::InMemoryJobRepository;
pub use products::InMemoryProductRepository;
pub use subscriptions::InMemorySubscriptionRepository;

/// Replace the entry with the same key or append a new one.
fn upsert<T: Clone, K: PartialEq>(entries: &mut Vec<T>, entry: &T, key: impl Fn(&T) -> &K) {
    match entries.iter_mut().find(|existing| key(existing) == key(entry)) {
        Some(existing) => *existing = entry.clone(),
        None => entries.push(entry.clone()),
    }
}
