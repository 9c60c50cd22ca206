use thiserror::Error;

use crate::config::SightConfig;
use crate::journal::{InputJournal, InputPayload, JOURNAL_FORMAT_VERSION};
use crate::scenario::{ScenarioError, ScenarioFile};
use crate::session::{Session, SessionError};
use crate::types::SightEvent;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("unsupported journal format version {0}")]
    UnsupportedVersion(u16),
    #[error("input #{seq} ({payload:?}) was rejected")]
    Rejected {
        seq: u64,
        payload: InputPayload,
        #[source]
        source: SessionError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_snapshot_hash: u64,
    pub final_frame: u64,
    pub battle_pending: bool,
    pub events: Vec<SightEvent>,
}

/// Builds the scenario's overworld and feeds it every journal input in order.
pub fn replay_to_end(
    scenario: &ScenarioFile,
    journal: &InputJournal,
    config: Option<SightConfig>,
) -> Result<ReplayResult, ReplayError> {
    let mut session = Session::new(scenario.build(config)?);
    replay_into(&mut session, journal)?;
    Ok(ReplayResult {
        final_snapshot_hash: session.snapshot_hash(),
        final_frame: session.current_frame(),
        battle_pending: session.battle_pending(),
        events: session.log().to_vec(),
    })
}

pub fn replay_into(session: &mut Session, journal: &InputJournal) -> Result<(), ReplayError> {
    if journal.format_version != JOURNAL_FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion(journal.format_version));
    }
    for record in &journal.inputs {
        session.apply(record.payload).map_err(|source| ReplayError::Rejected {
            seq: record.seq,
            payload: record.payload,
            source,
        })?;
    }
    Ok(())
}
