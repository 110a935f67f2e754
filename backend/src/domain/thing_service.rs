//! Thing create/update protocol and public reads.
//!
//! Submission order: canonical identifier, sanitisation, license check, then
//! the ownership gate under the identifier's lock. Every rejection happens
//! before the repository is written.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    SubmitAction, SubmitOutcome, ThingCommand, ThingQuery, ThingRepository, ThingRepositoryError,
    ThingSubmission,
};
use crate::domain::{
    Identity, KeyedLocks, LicenseRegistry, Rejection, Thing, ThingId, ThingMetadata,
    sanitize_text,
};

/// Parse a raw identifier into a [`ThingId`], reporting a payload violation.
pub(crate) fn parse_thing_id(raw: &str) -> Result<ThingId, Rejection> {
    ThingId::new(raw).map_err(|error| Rejection::invalid("/id", "invalid_id", error.to_string()))
}

/// Parse an identifier taken from a lookup path.
///
/// A malformed identifier cannot name a stored thing, so lookups report it as
/// not found rather than as a payload error.
pub(crate) fn lookup_thing_id(raw: &str) -> Result<ThingId, Rejection> {
    ThingId::new(raw).map_err(|_| Rejection::ThingNotFound {
        thing_id: raw.to_owned(),
    })
}

/// Implements [`ThingCommand`] and [`ThingQuery`].
#[derive(Clone)]
pub struct ThingService {
    repository: Arc<dyn ThingRepository>,
    licenses: Arc<LicenseRegistry>,
    locks: KeyedLocks,
    clock: Arc<dyn Clock>,
}

impl ThingService {
    /// `locks` must be shared with the artifact service so uploads and
    /// submissions on one thing are serialised.
    pub fn new(
        repository: Arc<dyn ThingRepository>,
        licenses: Arc<LicenseRegistry>,
        locks: KeyedLocks,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            licenses,
            locks,
            clock,
        }
    }

    fn metadata(&self, submission: ThingSubmission) -> Result<ThingMetadata, Rejection> {
        let ThingSubmission {
            title,
            description,
            license,
            license_url,
            ..
        } = submission;
        let title = sanitize_text(&title);
        if title.is_empty() {
            return Err(Rejection::invalid(
                "/title",
                "empty_title",
                "title must contain text once markup is removed",
            ));
        }
        let license = sanitize_text(&license);
        self.licenses.check(&license, &license_url)?;
        Ok(ThingMetadata {
            title,
            description: sanitize_text(&description),
            license,
            license_url,
        })
    }

    async fn create(&self, thing: Thing) -> Result<SubmitOutcome, Rejection> {
        match self.repository.insert_if_absent(&thing).await {
            Ok(()) => {
                info!(thing_id = %thing.id(), owner = %thing.owner(), "thing created");
                Ok(SubmitOutcome {
                    action: SubmitAction::Created,
                    thing,
                })
            }
            // Another writer created the record first; only its owner may proceed.
            Err(ThingRepositoryError::AlreadyExists { .. }) => {
                warn!(thing_id = %thing.id(), actor = %thing.owner(), "lost creation race");
                Err(Rejection::OwnershipViolation {
                    thing_id: thing.id().clone(),
                })
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[async_trait]
impl ThingCommand for ThingService {
    async fn submit(
        &self,
        submission: ThingSubmission,
        actor: &Identity,
    ) -> Result<SubmitOutcome, Rejection> {
        let id = parse_thing_id(&submission.id)?;
        let metadata = self.metadata(submission)?;

        let _guard = self.locks.lock(id.as_ref()).await;
        let now = self.clock.utc();
        match self.repository.find(&id).await? {
            None => self.create(Thing::create(id, metadata, actor.clone(), now)).await,
            Some(existing) if !existing.is_owned_by(actor) => {
                warn!(thing_id = %id, actor = %actor, owner = %existing.owner(), "ownership violation on submit");
                Err(Rejection::OwnershipViolation { thing_id: id })
            }
            Some(mut existing) => {
                existing.apply_metadata(metadata, now);
                self.repository.replace(&existing).await?;
                info!(thing_id = %id, owner = %actor, "thing updated");
                Ok(SubmitOutcome {
                    action: SubmitAction::Updated,
                    thing: existing,
                })
            }
        }
    }
}

#[async_trait]
impl ThingQuery for ThingService {
    async fn get(&self, thing_id: &str) -> Result<Thing, Rejection> {
        let id = lookup_thing_id(thing_id)?;
        self.repository
            .find(&id)
            .await?
            .ok_or_else(|| Rejection::ThingNotFound {
                thing_id: id.to_string(),
            })
    }

    async fn list(&self) -> Result<Vec<Thing>, Rejection> {
        Ok(self.repository.list().await?)
    }
}

#[cfg(test)]
#[path = "thing_service_tests.rs"]
mod tests;
