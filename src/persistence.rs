//! Saving and loading trained agents
//!
//! Agents are written as MessagePack via rmp_serde for compact binary
//! storage. Every failure mode, missing file, short read, corrupt or
//! incompatible payload, surfaces as [`Error::Persistence`] so callers can
//! uniformly fall back to a fresh agent.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    game::Mark,
    q_learning::{QLearningAgent, agent::AgentState},
};

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Provenance recorded alongside a saved agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Total episodes this agent has been trained for
    pub episodes_trained: u64,
    /// Short description of the training opponent ("self-play", "human")
    pub opponent: String,
    /// Unix timestamp of the save, if the clock was available
    pub saved_at: Option<u64>,
    /// Seed the training run used, if it was seeded
    pub seed: Option<u64>,
}

/// On-disk representation of a trained agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    version: u32,
    mark: Mark,
    state: AgentState,
    metadata: TrainingMetadata,
}

impl SavedAgent {
    /// Snapshot an agent together with its training provenance
    pub fn from_agent(agent: &QLearningAgent, mut metadata: TrainingMetadata) -> Self {
        metadata.saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs());
        Self {
            version: FORMAT_VERSION,
            mark: agent.mark(),
            state: agent.export_state(),
            metadata,
        }
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }

    /// Reconstruct the live agent
    pub fn into_agent(self) -> QLearningAgent {
        QLearningAgent::from_state(self.mark, self.state)
    }
}

/// Write a snapshot to `path`, truncating any existing file
///
/// # Errors
///
/// Returns [`Error::Persistence`] if the file cannot be created or the
/// payload cannot be encoded.
pub fn save_to_file(saved: &SavedAgent, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::Persistence {
        operation: format!("create file {path:?}"),
        message: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);

    rmp_serde::encode::write(&mut writer, saved).map_err(|e| Error::Persistence {
        operation: format!("serialize agent to {path:?}"),
        message: e.to_string(),
    })
}

/// Read a snapshot back from `path`
///
/// # Errors
///
/// Returns [`Error::Persistence`] if the file is missing, unreadable,
/// not valid MessagePack, or written by an incompatible format version.
pub fn load_from_file(path: &Path) -> Result<SavedAgent> {
    let file = File::open(path).map_err(|e| Error::Persistence {
        operation: format!("open file {path:?}"),
        message: e.to_string(),
    })?;
    let reader = BufReader::new(file);

    let saved: SavedAgent =
        rmp_serde::decode::from_read(reader).map_err(|e| Error::Persistence {
            operation: format!("deserialize agent from {path:?}"),
            message: e.to_string(),
        })?;

    if saved.version != FORMAT_VERSION {
        return Err(Error::Persistence {
            operation: format!("load agent from {path:?}"),
            message: format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                saved.version
            ),
        });
    }

    Ok(saved)
}
