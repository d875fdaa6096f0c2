use alloy_primitives::{keccak256, Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::PAIR_SEED,
    error::{DexError, Operation},
};

/// Derive the pair address for an ordered token pair.
///
/// `keccak256(PAIR_SEED ‖ token0 ‖ token1)`, last 20 bytes.
pub fn derive_pair(token0: &Address, token1: &Address) -> Address {
    let preimage = [PAIR_SEED, token0.as_slice(), token1.as_slice()].concat();
    Address::from_word(keccak256(preimage))
}

// ─── Side ──────────────────────────────────────────────────────────────────

/// Which of the two pool assets an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Token0,
    Token1,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Token0 => Side::Token1,
            Side::Token1 => Side::Token0,
        }
    }
}

// ─── Pool ──────────────────────────────────────────────────────────────────
// Constant-product pool (x * y = k).
// Fees stay embedded in the reserves; accumulated_fee_* is a parallel view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    /// Trading fee rate in basis points (e.g. 30 = 0.30 %)
    pub fee_rate_bps: u16,
    pub reserve0: U256,
    pub reserve1: U256,
    /// Total liquidity shares outstanding
    pub total_liquidity: U256,
    /// Fees collected since inception, less claims
    pub accumulated_fee0: U256,
    pub accumulated_fee1: U256,
    /// Cumulative fee earned per liquidity share, Q64.64 fixed-point
    pub fee_growth_global0: U256,
    pub fee_growth_global1: U256,
}

impl Pool {
    pub fn new(token0: Address, token1: Address, fee_rate_bps: u16) -> Self {
        Self {
            address: derive_pair(&token0, &token1),
            token0,
            token1,
            fee_rate_bps,
            reserve0: U256::ZERO,
            reserve1: U256::ZERO,
            total_liquidity: U256::ZERO,
            accumulated_fee0: U256::ZERO,
            accumulated_fee1: U256::ZERO,
            fee_growth_global0: U256::ZERO,
            fee_growth_global1: U256::ZERO,
        }
    }

    /// Resolve a token identifier to its side of the pair.
    pub fn side_of(&self, token: &Address, op: Operation) -> Result<Side, DexError> {
        if *token == self.token0 {
            Ok(Side::Token0)
        } else if *token == self.token1 {
            Ok(Side::Token1)
        } else {
            Err(DexError::UnknownAsset { op, token: *token })
        }
    }

    pub fn token(&self, side: Side) -> Address {
        match side {
            Side::Token0 => self.token0,
            Side::Token1 => self.token1,
        }
    }

    pub fn reserve(&self, side: Side) -> U256 {
        match side {
            Side::Token0 => self.reserve0,
            Side::Token1 => self.reserve1,
        }
    }

    pub(crate) fn reserve_mut(&mut self, side: Side) -> &mut U256 {
        match side {
            Side::Token0 => &mut self.reserve0,
            Side::Token1 => &mut self.reserve1,
        }
    }

    pub fn reserves(&self) -> (U256, U256) {
        (self.reserve0, self.reserve1)
    }

    pub fn fee_growth_global(&self) -> (U256, U256) {
        (self.fee_growth_global0, self.fee_growth_global1)
    }

    /// An empty pool has no reserves on either side (and no liquidity).
    pub fn is_empty(&self) -> bool {
        self.reserve0.is_zero() || self.reserve1.is_zero()
    }
}

// ─── Position ──────────────────────────────────────────────────────────────
// Tracks one provider's liquidity in a single pool. Never removed: a position
// whose shares return to zero is reset in place so the checkpoints persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub owner: Address,
    /// Liquidity shares this position holds
    pub shares: U256,
    /// Fee-growth snapshots at last sync (the position's fee debt)
    pub fee_growth_checkpoint0: U256,
    pub fee_growth_checkpoint1: U256,
    /// Settled but unclaimed fees
    pub fees_owed0: U256,
    pub fees_owed1: U256,
}

impl Position {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            shares: U256::ZERO,
            fee_growth_checkpoint0: U256::ZERO,
            fee_growth_checkpoint1: U256::ZERO,
            fees_owed0: U256::ZERO,
            fees_owed1: U256::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_zero()
    }

    /// Start (or restart) the position at the current global accumulators.
    pub(crate) fn checkpoint(&mut self, fee_growth_global0: U256, fee_growth_global1: U256) {
        self.fee_growth_checkpoint0 = fee_growth_global0;
        self.fee_growth_checkpoint1 = fee_growth_global1;
    }
}
