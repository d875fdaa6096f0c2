//! SimpleDEX — constant-product liquidity pool engine.
//!
//! 4 pool operations, each atomic and all-or-nothing:
//!   add_liquidity    — deposit both tokens, mint proportional shares
//!   remove_liquidity — burn shares, withdraw proportional reserves
//!   swap             — x·y=k trade with a 0.30 % fee kept in the pool
//!   claim_fees       — pay out fees accrued to a position
//!
//! Plus the read-only previews `get_swap_amount` and `get_claimable_fees`,
//! and a [`DexFactory`] that creates one pool per token pair.
//!
//! Fees are distributed without iterating providers: every swap bumps a
//! Q64.64 fee-per-share accumulator and each position keeps a checkpoint of
//! it (its fee debt). All arithmetic is integer with floor division.

pub mod constants;
pub mod error;
pub mod events;
pub mod factory;
pub mod instructions;
pub mod ledger;
pub mod state;

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

pub use alloy_primitives;
pub use constants::*;
pub use error::{DexError, Operation, Result};
pub use events::{DexEvent, EventSink};
pub use factory::DexFactory;
pub use instructions::*;
pub use ledger::{InMemoryLedger, LedgerError, TokenLedger};
pub use state::{derive_pair, Pool, Position, Side};

/// Collaborators of a mutating operation: where tokens move and where
/// events go.
pub struct Context<'a> {
    pub ledger: &'a mut dyn TokenLedger,
    pub events: &'a mut dyn EventSink,
}

impl<'a> Context<'a> {
    pub fn new(ledger: &'a mut dyn TokenLedger, events: &'a mut dyn EventSink) -> Self {
        Self { ledger, events }
    }
}

/// One pool and its liquidity-position ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleDex {
    pub(crate) pool: Pool,
    pub(crate) positions: BTreeMap<Address, Position>,
}

impl SimpleDex {
    pub fn new(pool: Pool) -> Self {
        Self { pool, positions: BTreeMap::new() }
    }

    // ── Mutating operations ───────────────────────────────────────────────────

    /// Deposit both tokens and receive liquidity shares.
    pub fn add_liquidity(
        &mut self,
        ctx: &mut Context<'_>,
        provider: Address,
        amount0: U256,
        amount1: U256,
    ) -> Result<AddLiquidityOutcome> {
        add_liquidity::handler(self, ctx, provider, amount0, amount1, U256::ZERO)
    }

    /// [`add_liquidity`](Self::add_liquidity) that fails when fewer than
    /// `min_shares` would be minted.
    pub fn add_liquidity_checked(
        &mut self,
        ctx: &mut Context<'_>,
        provider: Address,
        amount0: U256,
        amount1: U256,
        min_shares: U256,
    ) -> Result<AddLiquidityOutcome> {
        add_liquidity::handler(self, ctx, provider, amount0, amount1, min_shares)
    }

    /// Burn shares and withdraw proportional reserves.
    pub fn remove_liquidity(
        &mut self,
        ctx: &mut Context<'_>,
        provider: Address,
        shares: U256,
    ) -> Result<RemoveLiquidityOutcome> {
        remove_liquidity::handler(self, ctx, provider, shares, U256::ZERO, U256::ZERO)
    }

    /// [`remove_liquidity`](Self::remove_liquidity) with per-token minimums.
    pub fn remove_liquidity_checked(
        &mut self,
        ctx: &mut Context<'_>,
        provider: Address,
        shares: U256,
        min0: U256,
        min1: U256,
    ) -> Result<RemoveLiquidityOutcome> {
        remove_liquidity::handler(self, ctx, provider, shares, min0, min1)
    }

    /// Sell `amount_in` of `token_in`; fails if the output is below `min_amount_out`.
    pub fn swap(
        &mut self,
        ctx: &mut Context<'_>,
        trader: Address,
        token_in: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> Result<SwapOutcome> {
        swap::handler(self, ctx, trader, token_in, amount_in, min_amount_out)
    }

    /// Pay out the fees accrued to `provider`'s position.
    pub fn claim_fees(&mut self, ctx: &mut Context<'_>, provider: Address) -> Result<ClaimOutcome> {
        claim_fees::handler(self, ctx, provider)
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// Output for selling `amount_in` of `token_in` at current reserves.
    pub fn get_swap_amount(&self, token_in: &Address, amount_in: U256) -> Result<U256> {
        swap::quote(&self.pool, token_in, amount_in, Operation::GetSwapAmount).map(|(_, a)| a.amount_out)
    }

    /// `(fee0, fee1)` claimable by `provider`; zero without a position.
    pub fn get_claimable_fees(&self, provider: &Address) -> Result<(U256, U256)> {
        match self.positions.get(provider) {
            Some(position) => {
                let (fg0, fg1) = self.pool.fee_growth_global();
                fee_math::claimable_fees(Operation::ClaimFees, position, fg0, fg1)
            }
            None => Ok((U256::ZERO, U256::ZERO)),
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn address(&self) -> Address {
        self.pool.address
    }

    pub fn token0(&self) -> Address {
        self.pool.token0
    }

    pub fn token1(&self) -> Address {
        self.pool.token1
    }

    pub fn get_reserves(&self) -> (U256, U256) {
        self.pool.reserves()
    }

    pub fn total_liquidity(&self) -> U256 {
        self.pool.total_liquidity
    }

    /// Shares held by `provider`.
    pub fn get_user_liquidity(&self, provider: &Address) -> U256 {
        self.positions.get(provider).map(|p| p.shares).unwrap_or_default()
    }

    pub fn position(&self, provider: &Address) -> Option<&Position> {
        self.positions.get(provider)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }
}
