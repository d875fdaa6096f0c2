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

const OP: Operation = Operation::ClaimFees;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimOutcome {
    pub fee0: U256,
    pub fee1: U256,
}

/// Claim accumulated trading fees from a position.
///
/// Fees are embedded in the reserves, so paying them out lowers the
/// reserves as well as the accumulated-fee ledger. Each leg is paid up to
/// `reserve - 1`; whatever the pool cannot cover stays in `fees_owed` for a
/// later claim. A claim with nothing payable returns zeros without an event.
pub fn handler(dex: &mut SimpleDex, ctx: &mut Context<'_>, provider: Address) -> Result<ClaimOutcome> {
    let mut position = match dex.positions.get(&provider) {
        Some(p) if !p.is_empty() => p.clone(),
        _ => return Err(DexError::NoLiquidityPosition { provider }),
    };

    let pool = &dex.pool;
    let (fg0, fg1) = pool.fee_growth_global();
    accrue_fees(OP, &mut position, fg0, fg1)?;

    // Shares are outstanding, so each reserve keeps at least one unit
    let fee0 = position.fees_owed0.min(pool.reserve0.saturating_sub(U256::from(1)));
    let fee1 = position.fees_owed1.min(pool.reserve1.saturating_sub(U256::from(1)));
    position.fees_owed0 -= fee0;
    position.fees_owed1 -= fee1;
    if !position.fees_owed0.is_zero() || !position.fees_owed1.is_zero() {
        debug!(
            %provider,
            owed0 = %position.fees_owed0,
            owed1 = %position.fees_owed1,
            "reserves short of owed fees, remainder deferred"
        );
    }

    if fee0.is_zero() && fee1.is_zero() {
        debug!(%provider, "no fees to claim");
        dex.positions.insert(provider, position);
        return Ok(ClaimOutcome { fee0, fee1 });
    }

    let mut batch = TransferBatch::new();
    batch
        .push(pool.token0, pool.address, provider, fee0)
        .push(pool.token1, pool.address, provider, fee1);
    batch.execute(ctx.ledger).map_err(|source| {
        debug!(%provider, error = %source, "claim_fees transfer failed");
        DexError::TransferFailed { op: OP, source }
    })?;

    let pool = &mut dex.pool;
    pool.reserve0 -= fee0;
    pool.reserve1 -= fee1;
    pool.accumulated_fee0 = pool.accumulated_fee0.saturating_sub(fee0);
    pool.accumulated_fee1 = pool.accumulated_fee1.saturating_sub(fee1);
    dex.positions.insert(provider, position);

    let pair = dex.pool.address;
    ctx.events.emit(DexEvent::FeesClaimed { pair, provider, fee0, fee1 });
    info!(%pair, %provider, %fee0, %fee1, "fees claimed");

    Ok(ClaimOutcome { fee0, fee1 })
}
