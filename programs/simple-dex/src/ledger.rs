//! Asset-transfer capability.
//!
//! The engine never holds balances itself: it moves tokens between the pair
//! address and providers/traders through a [`TokenLedger`]. A batch of
//! transfers is all-or-nothing.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{owner} holds {available} of {token}, needs {needed}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        needed: U256,
        available: U256,
    },

    #[error("transfer of {token} rejected: {reason}")]
    Rejected { token: Address, reason: String },
}

/// Moves balances of fungible tokens between holders.
pub trait TokenLedger {
    fn balance_of(&self, token: &Address, owner: &Address) -> U256;

    /// Move `amount` of `token` from `from` to `to`. Must leave balances
    /// untouched on failure.
    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError>;
}

// ─── In-memory ledger ─────────────────────────────────────────────────────────

/// Balance book keyed by token, then holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    balances: BTreeMap<Address, BTreeMap<Address, U256>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `to` out of thin air (faucet).
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self.balances.entry(token).or_default().entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or_else(|| LedgerError::Rejected {
            token,
            reason: "balance overflow".into(),
        })?;
        debug!(%token, %to, %amount, "minted");
        Ok(())
    }

    /// Sum of all balances of `token`.
    pub fn total_supply(&self, token: &Address) -> U256 {
        self.balances
            .get(token)
            .map(|holders| holders.values().fold(U256::ZERO, |acc, b| acc.saturating_add(*b)))
            .unwrap_or_default()
    }

    /// Every non-zero balance held by `owner`.
    pub fn holdings(&self, owner: &Address) -> Vec<(Address, U256)> {
        self.balances
            .iter()
            .filter_map(|(token, holders)| {
                holders
                    .get(owner)
                    .filter(|b| !b.is_zero())
                    .map(|b| (*token, *b))
            })
            .collect()
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: &Address, owner: &Address) -> U256 {
        self.balances
            .get(token)
            .and_then(|holders| holders.get(owner))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: *token,
                owner: *from,
                needed: amount,
                available,
            });
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        let received = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Rejected {
                token: *token,
                reason: "balance overflow".into(),
            })?;
        let holders = self.balances.entry(*token).or_default();
        holders.insert(*from, available - amount);
        holders.insert(*to, received);
        Ok(())
    }
}

// ─── Transfer batch ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Leg {
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
}

/// Ordered set of transfers executed atomically: when a leg fails, the legs
/// already applied are reversed in reverse order.
#[derive(Debug, Default)]
pub(crate) struct TransferBatch {
    legs: Vec<Leg>,
}

impl TransferBatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a transfer. Zero-amount legs are dropped.
    pub(crate) fn push(&mut self, token: Address, from: Address, to: Address, amount: U256) -> &mut Self {
        if !amount.is_zero() {
            self.legs.push(Leg { token, from, to, amount });
        }
        self
    }

    pub(crate) fn execute(self, ledger: &mut dyn TokenLedger) -> Result<(), LedgerError> {
        for (i, leg) in self.legs.iter().enumerate() {
            if let Err(e) = ledger.transfer(&leg.token, &leg.from, &leg.to, leg.amount) {
                for done in self.legs[..i].iter().rev() {
                    // Reversing a leg that just succeeded only fails if the
                    // ledger itself is inconsistent.
                    if let Err(rollback) = ledger.transfer(&done.token, &done.to, &done.from, done.amount) {
                        tracing::error!(token = %done.token, error = %rollback, "transfer rollback failed");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}
