//! Pair registry: one [`SimpleDex`] per unordered token pair.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    constants::FEE_RATE_DEFAULT_BPS,
    error::{DexError, Result},
    events::EventSink,
    instructions::create_pair,
    SimpleDex,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexFactory {
    /// Pools in creation order
    pub(crate) pairs: Vec<SimpleDex>,
}

impl DexFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pair with the default 0.30 % fee.
    pub fn create_pair(&mut self, events: &mut dyn EventSink, token_a: Address, token_b: Address) -> Result<Address> {
        create_pair::handler(self, events, token_a, token_b, FEE_RATE_DEFAULT_BPS)
    }

    pub fn create_pair_with_fee(
        &mut self,
        events: &mut dyn EventSink,
        token_a: Address,
        token_b: Address,
        fee_rate_bps: u16,
    ) -> Result<Address> {
        create_pair::handler(self, events, token_a, token_b, fee_rate_bps)
    }

    /// Pair address for two tokens, in either order.
    pub fn get_pair(&self, token_a: &Address, token_b: &Address) -> Option<Address> {
        self.find(token_a, token_b).map(SimpleDex::address)
    }

    pub fn all_pairs_length(&self) -> usize {
        self.pairs.len()
    }

    /// Pair address by creation index.
    pub fn pair_at(&self, index: usize) -> Option<Address> {
        self.pairs.get(index).map(SimpleDex::address)
    }

    /// Pool for two tokens, in either order.
    pub fn find(&self, token_a: &Address, token_b: &Address) -> Option<&SimpleDex> {
        self.pairs.iter().find(|dex| {
            let pool = dex.pool();
            (pool.token0 == *token_a && pool.token1 == *token_b)
                || (pool.token0 == *token_b && pool.token1 == *token_a)
        })
    }

    pub fn dex(&self, pair: &Address) -> Option<&SimpleDex> {
        self.pairs.iter().find(|dex| dex.address() == *pair)
    }

    pub fn dex_mut(&mut self, pair: &Address) -> Result<&mut SimpleDex> {
        self.pairs
            .iter_mut()
            .find(|dex| dex.address() == *pair)
            .ok_or(DexError::PairNotFound(*pair))
    }

    pub fn pairs(&self) -> impl Iterator<Item = &SimpleDex> {
        self.pairs.iter()
    }
}
