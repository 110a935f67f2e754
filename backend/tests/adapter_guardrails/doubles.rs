//! Recording doubles for the driving ports exercised by the guardrails.

use cadinet::domain::ports::{SubmitOutcome, ThingCommand, ThingSubmission};
use cadinet::domain::{Identity, Rejection};

use crate::recording_double_macro::recording_double;

/// What the handler handed to the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCall {
    pub thing_id: String,
    pub title: String,
    pub actor: String,
}

recording_double! {
    pub enum SubmitResponse {
        Ok(SubmitOutcome),
        Err(Rejection),
    }

    pub struct RecordingThingCommand {
        calls: SubmitCall,
        trait: ThingCommand,
        method: submit(&self, submission: ThingSubmission, actor: &Identity)
            -> Result<SubmitOutcome, Rejection>,
        record: SubmitCall {
            thing_id: submission.id.clone(),
            title: submission.title.clone(),
            actor: actor.to_string(),
        },
    }
}
