//! SDK error type.

use alloy_primitives::Address;
use simple_dex::{DexError, LedgerError};

/// All errors returned by the SimpleDEX SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Engine ───────────────────────────────────────────────────────────────
    /// The pool engine rejected the operation; state is unchanged.
    #[error(transparent)]
    Dex(#[from] DexError),

    /// A direct ledger operation (mint) failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    // ── Pool discovery ───────────────────────────────────────────────────────
    /// No pair exists for the given tokens in either order.
    #[error("Pool not found for tokens {0} / {1}")]
    PoolNotFound(Address, Address),

    /// The pair exists but holds no reserves.
    #[error("Pool has no liquidity — seed it with provide_liquidity first")]
    NoLiquidity,

    // ── Provide liquidity ────────────────────────────────────────────────────
    /// Pool is empty and no `amount_b` was given to set the initial price.
    #[error("amount_b is required when the pool is empty (first deposit sets the price)")]
    AmountBRequired,

    /// The proportional `amount_b` computed from live reserves rounded to zero.
    #[error("Computed amount_b = 0 — deposit amount_a is too small relative to reserves; \
             pass amount_b explicitly")]
    AmountBZero,

    #[error("Integer overflow in fee / swap math")]
    MathOverflow,

    // ── Actor ────────────────────────────────────────────────────────────────
    /// The task that owns the pool state has stopped.
    #[error("DEX state task is no longer running")]
    ClientClosed,

    // ── Persistence ──────────────────────────────────────────────────────────
    #[error("State file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
