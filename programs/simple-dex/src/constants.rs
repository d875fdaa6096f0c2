use alloy_primitives::U256;

/// Seed prefix for pair address derivation
pub const PAIR_SEED: &[u8] = b"simple-dex/pair";

/// Default trading fee: 0.30 %
pub const FEE_RATE_DEFAULT_BPS: u16 = 30;

/// Allowed fee range, inclusive
pub const FEE_RATE_MIN_BPS: u16 = 1;
pub const FEE_RATE_MAX_BPS: u16 = 100;

/// Denominator for basis-point math
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Q64.64 fixed-point scale (fee growth accumulators)
pub const Q64: U256 = U256::from_limbs([0, 1, 0, 0]);
pub const Q64_SHIFT: usize = 64;
