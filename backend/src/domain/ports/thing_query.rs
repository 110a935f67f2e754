//! Driving port for public thing reads.

use async_trait::async_trait;

use crate::domain::{Rejection, Thing};

#[async_trait]
pub trait ThingQuery: Send + Sync {
    /// Fetch one thing by its raw identifier.
    async fn get(&self, thing_id: &str) -> Result<Thing, Rejection>;

    /// Every thing, oldest first.
    async fn list(&self) -> Result<Vec<Thing>, Rejection>;
}
