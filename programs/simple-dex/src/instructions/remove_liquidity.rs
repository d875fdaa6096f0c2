use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, info};

use super::fee_math::accrue_fees;
use crate::{
    error::{DexError, Operation, Result},
    events::DexEvent,
    ledger::TransferBatch,
    Context, SimpleDex,
};

const OP: Operation = Operation::RemoveLiquidity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoveLiquidityOutcome {
    pub amount0: U256,
    pub amount1: U256,
    pub reserve0: U256,
    pub reserve1: U256,
    /// Settled fees dropped because the position closed before claiming
    pub forfeited_fee0: U256,
    pub forfeited_fee1: U256,
}

/// Proportional redemption: `reserve × shares / total_liquidity`, floored.
pub fn amounts_for_shares(
    shares: U256,
    reserve0: U256,
    reserve1: U256,
    total_liquidity: U256,
) -> Result<(U256, U256)> {
    if total_liquidity.is_zero() {
        return Err(DexError::EmptyPool { op: OP });
    }
    let amount0 = reserve0.checked_mul(shares).ok_or(DexError::MathOverflow { op: OP })? / total_liquidity;
    let amount1 = reserve1.checked_mul(shares).ok_or(DexError::MathOverflow { op: OP })? / total_liquidity;
    Ok((amount0, amount1))
}

/// Burn shares and withdraw proportional reserves.
/// Fees are synced first. A position that closes forfeits its settled but
/// unclaimed fees; they stay undistributed and `accumulated_fee_*` only
/// moves on claims.
pub fn handler(
    dex: &mut SimpleDex,
    ctx: &mut Context<'_>,
    provider: Address,
    shares: U256,
    min0: U256,
    min1: U256,
) -> Result<RemoveLiquidityOutcome> {
    if shares.is_zero() {
        return Err(DexError::InvalidAmount { op: OP, reason: "shares must be greater than zero" });
    }
    let owned = dex.positions.get(&provider).map(|p| p.shares).unwrap_or_default();
    if owned < shares {
        return Err(DexError::InsufficientLiquidity { requested: shares, owned });
    }

    let pool = &dex.pool;
    let total = pool.total_liquidity;
    let (fg0, fg1) = pool.fee_growth_global();
    let (amount0, amount1) = amounts_for_shares(shares, pool.reserve0, pool.reserve1, total)?;

    if amount0 < min0 {
        return Err(DexError::SlippageExceeded { op: OP, output: amount0, min: min0 });
    }
    if amount1 < min1 {
        return Err(DexError::SlippageExceeded { op: OP, output: amount1, min: min1 });
    }

    // shares ≤ total, so amounts never exceed the reserves
    let reserve0 = pool.reserve0 - amount0;
    let reserve1 = pool.reserve1 - amount1;
    let total_after = total - shares;

    // Sync fees then reduce shares
    let mut position = dex.positions[&provider].clone();
    accrue_fees(OP, &mut position, fg0, fg1)?;
    position.shares -= shares;
    let (forfeited_fee0, forfeited_fee1) = if position.is_empty() {
        let forfeited = (position.fees_owed0, position.fees_owed1);
        position.fees_owed0 = U256::ZERO;
        position.fees_owed1 = U256::ZERO;
        forfeited
    } else {
        (U256::ZERO, U256::ZERO)
    };

    // Transfer tokens from the pair to the provider
    let mut batch = TransferBatch::new();
    batch
        .push(pool.token0, pool.address, provider, amount0)
        .push(pool.token1, pool.address, provider, amount1);
    batch.execute(ctx.ledger).map_err(|source| {
        debug!(%provider, error = %source, "remove_liquidity transfer failed");
        DexError::TransferFailed { op: OP, source }
    })?;

    let pool = &mut dex.pool;
    pool.reserve0 = reserve0;
    pool.reserve1 = reserve1;
    pool.total_liquidity = total_after;
    dex.positions.insert(provider, position);

    let pair = dex.pool.address;
    ctx.events.emit(DexEvent::LiquidityRemoved { pair, provider, shares, amount0, amount1 });
    info!(%pair, %provider, %shares, %amount0, %amount1, "liquidity removed");
    if !forfeited_fee0.is_zero() || !forfeited_fee1.is_zero() {
        debug!(%pair, %provider, fee0 = %forfeited_fee0, fee1 = %forfeited_fee1, "unclaimed fees forfeited on close");
    }

    Ok(RemoveLiquidityOutcome { amount0, amount1, reserve0, reserve1, forfeited_fee0, forfeited_fee1 })
}
