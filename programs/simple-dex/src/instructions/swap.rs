use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, info};

use super::fee_math::{compute_swap, fee_growth_delta, SwapAmounts};
use crate::{
    error::{DexError, Operation, Result},
    events::DexEvent,
    ledger::TransferBatch,
    state::{Pool, Side},
    Context, SimpleDex,
};

const OP: Operation = Operation::Swap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapOutcome {
    pub amount_out: U256,
    /// Fee retained in the input reserve and credited to providers
    pub fee: U256,
    pub reserve0: U256,
    pub reserve1: U256,
}

/// Side-effect-free preview of a swap's output.
pub fn quote(pool: &Pool, token_in: &Address, amount_in: U256, op: Operation) -> Result<(Side, SwapAmounts)> {
    let side_in = pool.side_of(token_in, op)?;
    let amounts = compute_swap(
        op,
        amount_in,
        pool.fee_rate_bps,
        pool.reserve(side_in),
        pool.reserve(side_in.other()),
    )?;
    Ok((side_in, amounts))
}

/// Core constant-product swap: x * y = k.
///
/// The fee is taken in the input token and never leaves the pool:
///   1. trader → pair       : amount_in (fee included)
///   2. pair   → trader     : amount_out
/// The input token's accumulated fee and per-share fee growth are credited
/// with the fee, so `reserve0 * reserve1` grows by the fee portion.
pub fn handler(
    dex: &mut SimpleDex,
    ctx: &mut Context<'_>,
    trader: Address,
    token_in: Address,
    amount_in: U256,
    min_amount_out: U256,
) -> Result<SwapOutcome> {
    if amount_in.is_zero() {
        return Err(DexError::InvalidAmount { op: OP, reason: "input amount must be greater than zero" });
    }

    let pool = &dex.pool;
    let (side_in, SwapAmounts { fee, amount_out, .. }) = quote(pool, &token_in, amount_in, OP)?;
    let side_out = side_in.other();

    if amount_out < min_amount_out {
        debug!(%trader, %amount_out, min = %min_amount_out, "swap rejected by slippage guard");
        return Err(DexError::SlippageExceeded { op: OP, output: amount_out, min: min_amount_out });
    }
    if amount_out.is_zero() {
        return Err(DexError::InvalidAmount { op: OP, reason: "output rounds to zero" });
    }

    let reserve_in = pool.reserve(side_in).checked_add(amount_in).ok_or(DexError::MathOverflow { op: OP })?;
    // amount_out < reserve_out whenever reserve_in > 0
    let reserve_out = pool.reserve(side_out) - amount_out;

    // ── Fee accounting (per-share growth, Q64.64) ───────────────────────────
    let delta = fee_growth_delta(OP, fee, pool.total_liquidity)?;
    let (accumulated, growth) = match side_in {
        Side::Token0 => (pool.accumulated_fee0, pool.fee_growth_global0),
        Side::Token1 => (pool.accumulated_fee1, pool.fee_growth_global1),
    };
    let accumulated = accumulated.checked_add(fee).ok_or(DexError::MathOverflow { op: OP })?;
    let growth = growth.checked_add(delta).ok_or(DexError::MathOverflow { op: OP })?;

    let token_out = pool.token(side_out);
    let mut batch = TransferBatch::new();
    batch
        .push(token_in, trader, pool.address, amount_in)
        .push(token_out, pool.address, trader, amount_out);
    batch.execute(ctx.ledger).map_err(|source| {
        debug!(%trader, error = %source, "swap transfer failed");
        DexError::TransferFailed { op: OP, source }
    })?;

    let pool = &mut dex.pool;
    *pool.reserve_mut(side_in) = reserve_in;
    *pool.reserve_mut(side_out) = reserve_out;
    match side_in {
        Side::Token0 => {
            pool.accumulated_fee0 = accumulated;
            pool.fee_growth_global0 = growth;
        }
        Side::Token1 => {
            pool.accumulated_fee1 = accumulated;
            pool.fee_growth_global1 = growth;
        }
    }

    let pair = pool.address;
    let (reserve0, reserve1) = pool.reserves();
    ctx.events.emit(DexEvent::Swapped { pair, trader, token_in, amount_in, amount_out });
    info!(%pair, %trader, %token_in, %amount_in, %amount_out, %fee, "swap");

    Ok(SwapOutcome { amount_out, fee, reserve0, reserve1 })
}
