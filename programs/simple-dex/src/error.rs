use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// The engine operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreatePair,
    AddLiquidity,
    RemoveLiquidity,
    GetSwapAmount,
    Swap,
    ClaimFees,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::CreatePair => "create_pair",
            Operation::AddLiquidity => "add_liquidity",
            Operation::RemoveLiquidity => "remove_liquidity",
            Operation::GetSwapAmount => "get_swap_amount",
            Operation::Swap => "swap",
            Operation::ClaimFees => "claim_fees",
        })
    }
}

/// Every failure is detected before pool state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DexError {
    #[error("{op}: invalid amount — {reason}")]
    InvalidAmount { op: Operation, reason: &'static str },

    #[error("remove_liquidity: requested {requested} shares but only {owned} are owned")]
    InsufficientLiquidity { requested: U256, owned: U256 },

    #[error("{op}: output below minimum — slippage exceeded (output={output}, min={min})")]
    SlippageExceeded { op: Operation, output: U256, min: U256 },

    #[error("{op}: pool has no liquidity")]
    EmptyPool { op: Operation },

    #[error("claim_fees: {provider} has no liquidity position")]
    NoLiquidityPosition { provider: Address },

    #[error("{op}: token transfer failed: {source}")]
    TransferFailed {
        op: Operation,
        #[source]
        source: LedgerError,
    },

    #[error("{op}: token {token} is not part of this pair")]
    UnknownAsset { op: Operation, token: Address },

    #[error("{op}: math overflow")]
    MathOverflow { op: Operation },

    #[error("fee rate must be 1–100 bps, got {0}")]
    InvalidFeeRate(u16),

    #[error("tokens must be different")]
    IdenticalTokens,

    #[error("invalid token address")]
    ZeroAddress,

    #[error("pair already exists: {pair}")]
    PairExists { pair: Address },

    #[error("pair {0} not found")]
    PairNotFound(Address),
}

impl DexError {
    /// The operation that failed, when the error belongs to one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            DexError::InvalidAmount { op, .. }
            | DexError::SlippageExceeded { op, .. }
            | DexError::EmptyPool { op }
            | DexError::TransferFailed { op, .. }
            | DexError::UnknownAsset { op, .. }
            | DexError::MathOverflow { op } => Some(*op),
            DexError::InsufficientLiquidity { .. } => Some(Operation::RemoveLiquidity),
            DexError::NoLiquidityPosition { .. } => Some(Operation::ClaimFees),
            DexError::InvalidFeeRate(_)
            | DexError::IdenticalTokens
            | DexError::ZeroAddress
            | DexError::PairExists { .. } => Some(Operation::CreatePair),
            DexError::PairNotFound(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DexError>;
