use serde::{Deserialize, Serialize};

use crate::types::Direction;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub payload: InputPayload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum InputPayload {
    Step { direction: Direction },
    Advance { frames: u32 },
    PrepareSecondTrainer,
    EndApproach,
    FaceAfterBattle { index: usize },
    RevealHidden { local_id: u8 },
}

impl Default for InputJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl InputJournal {
    pub fn new() -> Self {
        Self { format_version: JOURNAL_FORMAT_VERSION, inputs: Vec::new() }
    }

    pub fn append(&mut self, payload: InputPayload, seq: u64) {
        self.inputs.push(InputRecord { seq, payload });
    }

    /// Journal with sequence numbers assigned in order.
    pub fn from_payloads(payloads: impl IntoIterator<Item = InputPayload>) -> Self {
        let mut journal = Self::new();
        for (seq, payload) in payloads.into_iter().enumerate() {
            journal.append(payload, seq as u64);
        }
        journal
    }
}
