//! Everything the client owns: pairs, token balances and the event log.
//!
//! Persisted as a single JSON document so a CLI session can pick up where
//! the previous one stopped.

use std::{fs, io, path::Path};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use simple_dex::{Context, DexEvent, DexFactory, InMemoryLedger, SimpleDex};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexState {
    pub factory: DexFactory,
    pub ledger:  InMemoryLedger,
    pub events:  Vec<DexEvent>,
}

impl DexState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read state from `path`; a missing file yields an empty state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => {
                let state: Self = serde_json::from_slice(&bytes)?;
                debug!(path = %path.display(), pairs = state.factory.all_pairs_length(), "state loaded");
                Ok(state)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file, starting empty");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write state to `path` via a sibling temp file and rename, so a crash
    /// mid-write never leaves a truncated document.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "state saved");
        Ok(())
    }

    /// Pool for two tokens in either order.
    pub fn dex(&self, token_a: &Address, token_b: &Address) -> Result<&SimpleDex> {
        self.factory.find(token_a, token_b).ok_or(Error::PoolNotFound(*token_a, *token_b))
    }

    /// Pool for two tokens plus a context over this state's ledger and event log.
    pub fn dex_mut(&mut self, token_a: &Address, token_b: &Address) -> Result<(&mut SimpleDex, Context<'_>)> {
        let pair = self
            .factory
            .get_pair(token_a, token_b)
            .ok_or(Error::PoolNotFound(*token_a, *token_b))?;
        let dex = self.factory.dex_mut(&pair)?;
        Ok((dex, Context::new(&mut self.ledger, &mut self.events)))
    }
}
