//! Parameter and result types for [`DexClient`](crate::DexClient) calls.
//!
//! Parameters take tokens in the caller's order; results report both the
//! caller's view and the pool's `token0`/`token1` ordering where it matters.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

// ─── Create pair ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePairParams {
    pub token_a:      Address,
    pub token_b:      Address,
    /// Fee tier in basis points, 1–100.
    pub fee_rate_bps: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePairResult {
    pub pair:         Address,
    pub token0:       Address,
    pub token1:       Address,
    pub fee_rate_bps: u16,
    /// Number of pairs after creation; this pair's 1-based index.
    pub pair_count:   usize,
}

// ─── Provide / remove liquidity ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvideParams {
    pub owner:      Address,
    pub token_a:    Address,
    pub token_b:    Address,
    pub amount_a:   U256,
    /// `None` derives the proportional amount from live reserves.
    /// Required when the pool is empty.
    pub amount_b:   Option<U256>,
    /// Reject if fewer shares would be minted; zero disables the check.
    pub min_shares: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvideResult {
    pub pair:          Address,
    pub amount_a:      U256,
    pub amount_b:      U256,
    pub shares_minted: U256,
    pub reserve0:      U256,
    pub reserve1:      U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveParams {
    pub owner:        Address,
    pub token_a:      Address,
    pub token_b:      Address,
    pub shares:       U256,
    pub min_amount_a: U256,
    pub min_amount_b: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveResult {
    pub pair:            Address,
    pub shares:          U256,
    pub amount_a:        U256,
    pub amount_b:        U256,
    /// Unclaimed fees dropped because the position closed
    pub forfeited_fee_a: U256,
    pub forfeited_fee_b: U256,
}

// ─── Swap ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub owner:            Address,
    pub token_in:         Address,
    pub token_out:        Address,
    pub amount_in:        U256,
    /// Tolerated shortfall against the simulated output; 0 disables the guard.
    pub max_slippage_bps: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    pub pair:           Address,
    pub token_in:       Address,
    pub token_out:      Address,
    pub amount_in:      U256,
    pub amount_out:     U256,
    pub estimated_out:  U256,
    pub min_amount_out: U256,
    pub fee:            U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateParams {
    pub token_in:  Address,
    pub token_out: Address,
    pub amount_in: U256,
}

/// Fee and price-impact breakdown of a hypothetical swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulateResult {
    pub pair:             Address,
    pub token_in:         Address,
    pub token_out:        Address,
    pub amount_in:        U256,
    pub fee:              U256,
    /// amount_in − fee: the part that moves the curve
    pub effective_input:  U256,
    pub estimated_out:    U256,
    /// estimated_out / amount_in
    pub effective_rate:   f64,
    /// effective_input / (reserve_in + effective_input) × 100
    pub price_impact_pct: f64,
    pub fee_rate_bps:     u16,
    pub reserve_in:       U256,
    pub reserve_out:      U256,
}

// ─── Queries ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub pair:             Address,
    pub token0:           Address,
    pub token1:           Address,
    pub reserve0:         U256,
    pub reserve1:         U256,
    pub total_liquidity:  U256,
    pub fee_rate_bps:     u16,
    /// token1 per token0
    pub spot_price:       f64,
    pub accumulated_fee0: U256,
    pub accumulated_fee1: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub pair:          Address,
    pub owner:         Address,
    pub token0:        Address,
    pub token1:        Address,
    pub shares:        U256,
    /// shares / total_liquidity × 100
    pub pool_share_pct: f64,
    /// Settled at the last share change, not yet claimed
    pub fees_owed0:    U256,
    pub fees_owed1:    U256,
    /// Accrued since the last checkpoint
    pub pending_fee0:  U256,
    pub pending_fee1:  U256,
    pub total_fee0:    U256,
    pub total_fee1:    U256,
}

/// Claimable fees across every position of one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub positions: Vec<PositionInfo>,
    /// Per-token total of `total_fee0`/`total_fee1`
    pub totals:    BTreeMap<Address, U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResult {
    pub pair:   Address,
    pub token0: Address,
    pub token1: Address,
    pub fee0:   U256,
    pub fee1:   U256,
}
