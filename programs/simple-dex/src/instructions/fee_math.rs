use alloy_primitives::U256;

use crate::{
    constants::*,
    error::{DexError, Operation, Result},
    state::Position,
};

/// Result of swap fee and output calculations, shared by `swap` and the
/// `get_swap_amount` preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAmounts {
    /// Portion of amount_in withheld from pricing; stays in the reserve.
    pub fee: U256,
    /// amount_in − fee: the portion that moves the curve.
    pub effective_input: U256,
    /// Tokens sent to the trader from the output reserve.
    pub amount_out: U256,
}

/// Compute the fee split and constant-product output.
///
/// * `amount_in`    – raw token amount the trader is selling
/// * `fee_rate_bps` – pool fee rate in basis points
/// * `reserve_in`   – reserve of the input token
/// * `reserve_out`  – reserve of the output token
pub fn compute_swap(
    op: Operation,
    amount_in: U256,
    fee_rate_bps: u16,
    reserve_in: U256,
    reserve_out: U256,
) -> Result<SwapAmounts> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(DexError::EmptyPool { op });
    }

    // effective = amount_in * (10_000 − fee) / 10_000; at 30 bps this is
    // exactly amount_in * 997 / 1000 under floor division.
    let keep_bps = BPS_DENOMINATOR - U256::from(fee_rate_bps);
    let effective_input = amount_in
        .checked_mul(keep_bps)
        .ok_or(DexError::MathOverflow { op })?
        / BPS_DENOMINATOR;
    let fee = amount_in - effective_input;

    // ── Constant-product output: dy = y * dx_eff / (x + dx_eff) ─────────────
    let amount_out = reserve_out
        .checked_mul(effective_input)
        .ok_or(DexError::MathOverflow { op })?
        / reserve_in
            .checked_add(effective_input)
            .ok_or(DexError::MathOverflow { op })?;

    Ok(SwapAmounts { fee, effective_input, amount_out })
}

/// Q64.64 increment of the per-share accumulator for `fee` spread over
/// `total_liquidity` shares. The floor remainder stays undistributed.
pub fn fee_growth_delta(op: Operation, fee: U256, total_liquidity: U256) -> Result<U256> {
    if fee.is_zero() || total_liquidity.is_zero() {
        return Ok(U256::ZERO);
    }
    Ok(fee.checked_mul(Q64).ok_or(DexError::MathOverflow { op })? / total_liquidity)
}

/// Fees earned by `shares` between `checkpoint` and `global`:
/// `shares × (global − checkpoint) >> 64`.
pub fn pending_fee(op: Operation, shares: U256, global: U256, checkpoint: U256) -> Result<U256> {
    let delta = global.saturating_sub(checkpoint);
    Ok(shares.checked_mul(delta).ok_or(DexError::MathOverflow { op })? >> Q64_SHIFT)
}

// ─── Fee accrual ───────────────────────────────────────────────────────────
// Call before any change to position.shares.
/// Settle the fees accrued since the last checkpoint into `fees_owed` and
/// advance the checkpoint. Returns the amounts just settled.
pub fn accrue_fees(
    op: Operation,
    position: &mut Position,
    fee_growth_global0: U256,
    fee_growth_global1: U256,
) -> Result<(U256, U256)> {
    let fees0 = pending_fee(op, position.shares, fee_growth_global0, position.fee_growth_checkpoint0)?;
    let fees1 = pending_fee(op, position.shares, fee_growth_global1, position.fee_growth_checkpoint1)?;

    position.fees_owed0 = position
        .fees_owed0
        .checked_add(fees0)
        .ok_or(DexError::MathOverflow { op })?;
    position.fees_owed1 = position
        .fees_owed1
        .checked_add(fees1)
        .ok_or(DexError::MathOverflow { op })?;
    position.checkpoint(fee_growth_global0, fee_growth_global1);
    Ok((fees0, fees1))
}

/// Claimable `(fee0, fee1)` for a position without mutating it.
pub fn claimable_fees(
    op: Operation,
    position: &Position,
    fee_growth_global0: U256,
    fee_growth_global1: U256,
) -> Result<(U256, U256)> {
    if position.is_empty() {
        return Ok((U256::ZERO, U256::ZERO));
    }
    let mut synced = position.clone();
    accrue_fees(op, &mut synced, fee_growth_global0, fee_growth_global1)?;
    Ok((synced.fees_owed0, synced.fees_owed1))
}
