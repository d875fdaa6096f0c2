use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Events emitted by committed operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DexEvent {
    PairCreated {
        token0: Address,
        token1: Address,
        pair: Address,
        /// Number of pairs after this one was created
        pair_count: u64,
    },
    LiquidityAdded {
        pair: Address,
        provider: Address,
        amount0: U256,
        amount1: U256,
        shares_minted: U256,
    },
    LiquidityRemoved {
        pair: Address,
        provider: Address,
        shares: U256,
        amount0: U256,
        amount1: U256,
    },
    Swapped {
        pair: Address,
        trader: Address,
        token_in: Address,
        amount_in: U256,
        amount_out: U256,
    },
    FeesClaimed {
        pair: Address,
        provider: Address,
        fee0: U256,
        fee1: U256,
    },
}

impl DexEvent {
    /// Pair the event belongs to.
    pub fn pair(&self) -> Address {
        match self {
            DexEvent::PairCreated { pair, .. }
            | DexEvent::LiquidityAdded { pair, .. }
            | DexEvent::LiquidityRemoved { pair, .. }
            | DexEvent::Swapped { pair, .. }
            | DexEvent::FeesClaimed { pair, .. } => *pair,
        }
    }
}

/// Receives events in commit order.
pub trait EventSink {
    fn emit(&mut self, event: DexEvent);
}

impl EventSink for Vec<DexEvent> {
    fn emit(&mut self, event: DexEvent) {
        self.push(event);
    }
}
