//! SimpleDEX Rust SDK — integration example
//!
//! Demonstrates: create a pair, provide liquidity, simulate, swap, and fee
//! queries. Everything runs against a fresh in-memory state; pass a path as
//! the first argument to persist it.
//!
//! ```bash
//! cargo run -p simple-dex-sdk --example agent -- /tmp/dex-state.json
//! ```

use alloy_primitives::{address, Address, U256};
use simple_dex_sdk::{
    CreatePairParams, DexClient, DexState, ProvideParams, RemoveParams, SimulateParams, SwapParams,
};

// ─── Accounts and tokens ──────────────────────────────────────────────────────

const WAPS:  Address = address!("0xADb64775Fc297B7D3762c6CB7fA0D41099Cd2d73");
const SUSDC: Address = address!("0x17f5c0cEc8c989566ED3b0f6177CcC69c4429C54");

const LP:     Address = address!("0x00000000000000000000000000000000000000a1");
const TRADER: Address = address!("0x00000000000000000000000000000000000000b0");

// ─── Example 1: Create and seed a pool ────────────────────────────────────────

async fn example_create_and_seed(client: &DexClient) {
    println!("\n── Create pair: WAPS/SUSDC (30 bps) ─────────────────────────");

    let created = client
        .create_pair(CreatePairParams { token_a: WAPS, token_b: SUSDC, fee_rate_bps: 30 })
        .await
        .expect("create_pair failed");
    println!("  Pair:          {}", created.pair);
    println!("  Pairs total:   {}", created.pair_count);

    client.mint(WAPS, LP, U256::from(100_000u64)).await.expect("mint failed");
    client.mint(SUSDC, LP, U256::from(200_000u64)).await.expect("mint failed");

    let provided = client
        .provide_liquidity(ProvideParams {
            owner:      LP,
            token_a:    WAPS,
            token_b:    SUSDC,
            amount_a:   U256::from(10_000u64),
            amount_b:   Some(U256::from(20_000u64)),
            min_shares: U256::ZERO,
        })
        .await
        .expect("provide failed");
    println!("  Shares minted: {}", provided.shares_minted);
    println!("  Reserves:      {} / {}", provided.reserve0, provided.reserve1);
}

// ─── Example 2: Simulate a swap ───────────────────────────────────────────────

/// Fee and slippage breakdown before spending anything.
async fn example_simulate(client: &DexClient) {
    println!("\n── Simulate swap: 100 WAPS → SUSDC ─────────────────────────");

    let sim = client
        .simulate(SimulateParams { token_in: WAPS, token_out: SUSDC, amount_in: U256::from(100u64) })
        .await
        .expect("simulate failed");

    println!("  Fee:            {} ({} bps)", sim.fee, sim.fee_rate_bps);
    println!("  After fees:     {}", sim.effective_input);
    println!("  Estimated out:  {}", sim.estimated_out);
    println!("  Effective rate: {:.6}", sim.effective_rate);
    println!("  Price impact:   {:.3}%", sim.price_impact_pct);
}

// ─── Example 3: Execute a swap ────────────────────────────────────────────────

async fn example_swap(client: &DexClient) {
    println!("\n── Swap: 100 WAPS → SUSDC, 1% max slippage ─────────────────");

    client.mint(WAPS, TRADER, U256::from(1_000u64)).await.expect("mint failed");
    let result = client
        .convert(SwapParams {
            owner:            TRADER,
            token_in:         WAPS,
            token_out:        SUSDC,
            amount_in:        U256::from(100u64),
            max_slippage_bps: 100,
        })
        .await
        .expect("swap failed");

    println!("  Amount in:     {}", result.amount_in);
    println!("  Received:      {}", result.amount_out);
    println!("  Min out:       {}", result.min_amount_out);
    println!("  Fee kept:      {}", result.fee);
}

// ─── Example 4: Fees, claim and exit ──────────────────────────────────────────

async fn example_fees_and_exit(client: &DexClient) {
    println!("\n── Fees: LP position ────────────────────────────────────────");

    let summary = client.my_fees(LP).await.expect("my_fees failed");
    for p in &summary.positions {
        println!("  Pair {}  shares {}  ({:.2}% of pool)", p.pair, p.shares, p.pool_share_pct);
        println!("    claimable  {} / {}", p.total_fee0, p.total_fee1);
    }

    let claimed = client.claim_fees(LP, WAPS, SUSDC).await.expect("claim failed");
    println!("  Claimed:       {} / {}", claimed.fee0, claimed.fee1);

    let position = client
        .position(LP, WAPS, SUSDC)
        .await
        .expect("position failed")
        .expect("LP has a position");
    let removed = client
        .remove_liquidity(RemoveParams {
            owner:        LP,
            token_a:      WAPS,
            token_b:      SUSDC,
            shares:       position.shares / U256::from(2u64),
            min_amount_a: U256::ZERO,
            min_amount_b: U256::ZERO,
        })
        .await
        .expect("remove failed");
    println!("  Withdrew:      {} WAPS + {} SUSDC", removed.amount_a, removed.amount_b);
}

// ─── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let path = std::env::args().nth(1);
    let state = match &path {
        Some(p) => DexState::load(p).expect("cannot load state"),
        None => DexState::new(),
    };
    let client = DexClient::spawn(state);

    if client.pairs().await.expect("pairs failed").is_empty() {
        example_create_and_seed(&client).await;
    }
    example_simulate(&client).await;
    example_swap(&client).await;
    example_fees_and_exit(&client).await;

    if let Some(p) = path {
        client.snapshot().await.expect("snapshot failed").save(&p).expect("cannot save state");
        println!("\nState saved to {p}");
    }
}
