use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, info};

use super::fee_math::accrue_fees;
use crate::{
    error::{DexError, Operation, Result},
    events::DexEvent,
    ledger::TransferBatch,
    state::Position,
    Context, SimpleDex,
};

const OP: Operation = Operation::AddLiquidity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddLiquidityOutcome {
    pub shares_minted: U256,
    pub reserve0: U256,
    pub reserve1: U256,
}

/// Shares minted for a deposit.
///
/// Empty pool: `amount0` exactly, so the first depositor fixes the price
/// ratio. Otherwise proportional to the smaller of the two deposit ratios;
/// a mismatched ratio is not corrected and its excess stays in the pool.
pub fn shares_for_deposit(
    amount0: U256,
    amount1: U256,
    reserve0: U256,
    reserve1: U256,
    total_liquidity: U256,
) -> Result<U256> {
    if total_liquidity.is_zero() {
        return Ok(amount0);
    }
    if reserve0.is_zero() || reserve1.is_zero() {
        return Err(DexError::EmptyPool { op: OP });
    }
    let by0 = amount0
        .checked_mul(total_liquidity)
        .ok_or(DexError::MathOverflow { op: OP })?
        / reserve0;
    let by1 = amount1
        .checked_mul(total_liquidity)
        .ok_or(DexError::MathOverflow { op: OP })?
        / reserve1;
    Ok(by0.min(by1))
}

// ─── Handler ──────────────────────────────────────────────────────────────
/// Add liquidity and mint shares to `provider`. Pending fees on an existing
/// position are settled before its share balance changes.
pub fn handler(
    dex: &mut SimpleDex,
    ctx: &mut Context<'_>,
    provider: Address,
    amount0: U256,
    amount1: U256,
    min_shares: U256,
) -> Result<AddLiquidityOutcome> {
    if amount0.is_zero() || amount1.is_zero() {
        return Err(DexError::InvalidAmount { op: OP, reason: "both deposit amounts must be greater than zero" });
    }

    // Read pool state into locals before any mutation
    let pool = &dex.pool;
    let total = pool.total_liquidity;
    let (fg0, fg1) = pool.fee_growth_global();

    let shares_minted = shares_for_deposit(amount0, amount1, pool.reserve0, pool.reserve1, total)?;
    if shares_minted.is_zero() {
        return Err(DexError::InvalidAmount { op: OP, reason: "deposit too small to mint liquidity shares" });
    }
    if shares_minted < min_shares {
        return Err(DexError::SlippageExceeded { op: OP, output: shares_minted, min: min_shares });
    }

    let reserve0 = pool.reserve0.checked_add(amount0).ok_or(DexError::MathOverflow { op: OP })?;
    let reserve1 = pool.reserve1.checked_add(amount1).ok_or(DexError::MathOverflow { op: OP })?;
    let total_after = total.checked_add(shares_minted).ok_or(DexError::MathOverflow { op: OP })?;

    // Sync fees on a copy of the position; committed only after transfers
    let mut position = dex.positions.get(&provider).cloned().unwrap_or_else(|| Position::new(provider));
    if position.is_empty() {
        position.checkpoint(fg0, fg1);
    } else {
        accrue_fees(OP, &mut position, fg0, fg1)?;
    }
    position.shares = position.shares.checked_add(shares_minted).ok_or(DexError::MathOverflow { op: OP })?;

    // Pull tokens from the provider into the pair
    let mut batch = TransferBatch::new();
    batch
        .push(pool.token0, provider, pool.address, amount0)
        .push(pool.token1, provider, pool.address, amount1);
    batch.execute(ctx.ledger).map_err(|source| {
        debug!(%provider, error = %source, "add_liquidity transfer failed");
        DexError::TransferFailed { op: OP, source }
    })?;

    let pool = &mut dex.pool;
    pool.reserve0 = reserve0;
    pool.reserve1 = reserve1;
    pool.total_liquidity = total_after;
    dex.positions.insert(provider, position);

    let pair = dex.pool.address;
    ctx.events.emit(DexEvent::LiquidityAdded { pair, provider, amount0, amount1, shares_minted });
    info!(%pair, %provider, %amount0, %amount1, shares = %shares_minted, "liquidity added");

    Ok(AddLiquidityOutcome { shares_minted, reserve0, reserve1 })
}
