//! SimpleDEX Rust SDK
//!
//! Async client for the SimpleDEX constant-product pool engine.
//! Any Rust service can create pairs, swap, provide liquidity and query pool
//! state without touching the engine's context plumbing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use simple_dex_sdk::{CreatePairParams, DexClient, DexState, ProvideParams, SimulateParams, SwapParams};
//! use alloy_primitives::{address, U256};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DexClient::spawn(DexState::load("dex-state.json")?);
//!     let agent  = address!("0x00000000000000000000000000000000000000a1");
//!     let waps   = address!("0xADb64775Fc297B7D3762c6CB7fA0D41099Cd2d73");
//!     let susdc  = address!("0x17f5c0cEc8c989566ED3b0f6177CcC69c4429C54");
//!
//!     client.create_pair(CreatePairParams { token_a: waps, token_b: susdc, fee_rate_bps: 30 }).await?;
//!     client.mint(waps, agent, U256::from(10_000u64)).await?;
//!     client.mint(susdc, agent, U256::from(10_000u64)).await?;
//!     client.provide_liquidity(ProvideParams {
//!         owner: agent, token_a: waps, token_b: susdc,
//!         amount_a: U256::from(1_000u64), amount_b: Some(U256::from(2_000u64)),
//!         min_shares: U256::ZERO,
//!     }).await?;
//!
//!     // 1. Simulate first to check the trade
//!     let sim = client.simulate(SimulateParams {
//!         token_in: waps, token_out: susdc, amount_in: U256::from(10u64),
//!     }).await?;
//!     println!("Estimated out: {}  price_impact: {:.2}%", sim.estimated_out, sim.price_impact_pct);
//!
//!     // 2. Execute with 0.5% max slippage
//!     let result = client.convert(SwapParams {
//!         owner:            agent,
//!         token_in:         waps,
//!         token_out:        susdc,
//!         amount_in:        U256::from(10u64),
//!         max_slippage_bps: 50,
//!     }).await?;
//!     println!("Swapped! received {}", result.amount_out);
//!
//!     client.snapshot().await?.save("dex-state.json")?;
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`DexClient::create_pair`] | Create a new pool for a token pair |
//! | [`DexClient::provide_liquidity`] | Deposit tokens, receive liquidity shares |
//! | [`DexClient::remove_liquidity`] | Burn shares, withdraw reserves |
//! | [`DexClient::convert`] | Atomic swap with slippage tolerance |
//! | [`DexClient::simulate`] | Fee + price-impact breakdown |
//! | [`DexClient::pool_info`] | Pool reserves, price, fee rate |
//! | [`DexClient::my_positions`] | All liquidity positions for an owner |
//! | [`DexClient::my_fees`] | Aggregated claimable fees |
//! | [`DexClient::claim_fees`] | Pay out accrued fees |

pub mod client;
pub mod error;
pub mod math;
pub mod state;
pub mod types;

pub use client::DexClient;
pub use error::{Error, Result};
pub use state::DexState;
pub use types::*;
