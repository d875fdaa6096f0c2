pub mod add_liquidity;
pub mod claim_fees;
pub mod create_pair;
pub mod fee_math;
pub mod remove_liquidity;
pub mod swap;

pub use add_liquidity::AddLiquidityOutcome;
pub use claim_fees::ClaimOutcome;
pub use fee_math::SwapAmounts;
pub use remove_liquidity::RemoveLiquidityOutcome;
pub use swap::SwapOutcome;
