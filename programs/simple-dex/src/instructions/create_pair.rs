use alloy_primitives::Address;
use tracing::info;

use crate::{
    constants::*,
    error::{DexError, Result},
    events::{DexEvent, EventSink},
    factory::DexFactory,
    state::Pool,
    SimpleDex,
};

/// Create a new, empty constant-product pool for `token0`/`token1`.
/// Any caller may create a pair; the creator sets the fee tier (1–100 bps).
/// A pair is unique regardless of token order.
pub fn handler(
    factory: &mut DexFactory,
    events: &mut dyn EventSink,
    token0: Address,
    token1: Address,
    fee_rate_bps: u16,
) -> Result<Address> {
    if token0 == token1 {
        return Err(DexError::IdenticalTokens);
    }
    if token0.is_zero() || token1.is_zero() {
        return Err(DexError::ZeroAddress);
    }
    if !(FEE_RATE_MIN_BPS..=FEE_RATE_MAX_BPS).contains(&fee_rate_bps) {
        return Err(DexError::InvalidFeeRate(fee_rate_bps));
    }
    if let Some(pair) = factory.get_pair(&token0, &token1) {
        return Err(DexError::PairExists { pair });
    }

    let dex = SimpleDex::new(Pool::new(token0, token1, fee_rate_bps));
    let pair = dex.address();
    factory.pairs.push(dex);
    let pair_count = factory.all_pairs_length() as u64;

    events.emit(DexEvent::PairCreated { token0, token1, pair, pair_count });
    info!(%token0, %token1, %pair, fee_bps = fee_rate_bps, pair_count, "pair created");
    Ok(pair)
}
