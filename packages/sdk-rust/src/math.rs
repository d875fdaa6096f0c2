//! Simulation and fee math.
//!
//! Delegates to the engine's own quote and fee functions so estimates match
//! executed results exactly; only the floating-point summaries live here.

use alloy_primitives::{Address, U256};
use simple_dex::{fee_math, swap, Operation, Pool, Position, BPS_DENOMINATOR};

use crate::error::{Error, Result};
use crate::types::SimulateResult;

// ─── Simulation ───────────────────────────────────────────────────────────────

/// Full fee and slippage breakdown for a hypothetical swap against `pool`.
pub fn simulate_detailed(pool: &Pool, token_in: &Address, amount_in: U256) -> Result<SimulateResult> {
    if pool.is_empty() {
        return Err(Error::NoLiquidity);
    }
    if amount_in.is_zero() {
        return Err(Error::InvalidArgument("amount_in must be greater than zero".into()));
    }

    let (side_in, amounts) = swap::quote(pool, token_in, amount_in, Operation::GetSwapAmount)?;
    let side_out = side_in.other();
    let reserve_in = pool.reserve(side_in);
    let reserve_out = pool.reserve(side_out);

    let effective_rate = ratio(amounts.amount_out, amount_in);
    let price_impact_pct = ratio(amounts.effective_input, reserve_in + amounts.effective_input) * 100.0;

    Ok(SimulateResult {
        pair:             pool.address,
        token_in:         *token_in,
        token_out:        pool.token(side_out),
        amount_in,
        fee:              amounts.fee,
        effective_input:  amounts.effective_input,
        estimated_out:    amounts.amount_out,
        effective_rate,
        price_impact_pct,
        fee_rate_bps:     pool.fee_rate_bps,
        reserve_in,
        reserve_out,
    })
}

/// Lowest acceptable output for `estimated` with `max_slippage_bps` tolerance.
/// `0` bps disables the guard.
pub fn min_amount_out(estimated: U256, max_slippage_bps: u16) -> U256 {
    if max_slippage_bps == 0 {
        return U256::ZERO;
    }
    let tolerance = estimated.saturating_mul(U256::from(max_slippage_bps)) / BPS_DENOMINATOR;
    estimated.saturating_sub(tolerance)
}

// ─── Liquidity ────────────────────────────────────────────────────────────────

/// Compute proportional `amount_b` for `provide_liquidity`.
///
/// - If `amount_b` is `Some`, return it unchanged.
/// - If the pool is empty (`total_liquidity == 0`), `amount_b` is required.
/// - Otherwise `amount_b = amount_a × reserve_b / reserve_a`.
pub fn compute_amount_b(
    amount_a:        U256,
    amount_b:        Option<U256>,
    reserve_a:       U256,
    reserve_b:       U256,
    total_liquidity: U256,
) -> Result<U256> {
    if let Some(b) = amount_b {
        return Ok(b);
    }
    if total_liquidity.is_zero() {
        return Err(Error::AmountBRequired);
    }
    if reserve_a.is_zero() {
        return Err(Error::NoLiquidity);
    }
    let b = amount_a.checked_mul(reserve_b).ok_or(Error::MathOverflow)? / reserve_a;
    if b.is_zero() {
        return Err(Error::AmountBZero);
    }
    Ok(b)
}

// ─── Pending fees ─────────────────────────────────────────────────────────────

/// `(pending0, pending1)` accrued since the position's last checkpoint.
pub fn pending_fees_for_position(position: &Position, pool: &Pool) -> Result<(U256, U256)> {
    let (fg0, fg1) = pool.fee_growth_global();
    let op = Operation::ClaimFees;
    let pending0 = fee_math::pending_fee(op, position.shares, fg0, position.fee_growth_checkpoint0)?;
    let pending1 = fee_math::pending_fee(op, position.shares, fg1, position.fee_growth_checkpoint1)?;
    Ok((pending0, pending1))
}

// ─── Display helpers ──────────────────────────────────────────────────────────

/// token1 per token0; `0.0` for an empty pool.
pub fn spot_price(reserve0: U256, reserve1: U256) -> f64 {
    ratio(reserve1, reserve0)
}

/// `numerator / denominator` as a float; `0.0` when the denominator is zero.
pub fn ratio(numerator: U256, denominator: U256) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    to_f64(numerator) / to_f64(denominator)
}

/// Lossy conversion for display; amounts beyond f64 range saturate.
pub fn to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}
