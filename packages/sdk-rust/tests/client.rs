use alloy_primitives::{Address, U256};
use simple_dex::{DexError, DexEvent, Operation};
use simple_dex_sdk::{
    CreatePairParams, DexClient, DexState, Error, ProvideParams, RemoveParams, SimulateParams, SwapParams,
};

const WAPS: Address = Address::repeat_byte(0x11);
const SUSDC: Address = Address::repeat_byte(0x22);
const ALICE: Address = Address::repeat_byte(0xa1);
const BOB: Address = Address::repeat_byte(0xb0);

fn u(n: u64) -> U256 {
    U256::from(n)
}

/// WAPS/SUSDC pair seeded by Alice at 1000 : 2000, Bob funded to trade.
async fn seeded() -> DexClient {
    let client = DexClient::spawn(DexState::new());
    client
        .create_pair(CreatePairParams { token_a: WAPS, token_b: SUSDC, fee_rate_bps: 30 })
        .await
        .unwrap();
    for who in [ALICE, BOB] {
        client.mint(WAPS, who, u(1_000_000)).await.unwrap();
        client.mint(SUSDC, who, u(1_000_000)).await.unwrap();
    }
    client
        .provide_liquidity(ProvideParams {
            owner:      ALICE,
            token_a:    WAPS,
            token_b:    SUSDC,
            amount_a:   u(1000),
            amount_b:   Some(u(2000)),
            min_shares: U256::ZERO,
        })
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn create_pair_reports_count() {
    let client = DexClient::spawn(DexState::new());

    let first = client
        .create_pair(CreatePairParams { token_a: WAPS, token_b: SUSDC, fee_rate_bps: 30 })
        .await
        .unwrap();
    let dup = client
        .create_pair(CreatePairParams { token_a: SUSDC, token_b: WAPS, fee_rate_bps: 30 })
        .await
        .unwrap_err();

    assert_eq!(first.pair_count, 1);
    assert!(matches!(dup, Error::Dex(DexError::PairExists { pair }) if pair == first.pair));
    assert_eq!(client.pairs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn provide_computes_proportional_amount() {
    let client = seeded().await;

    // token order reversed: 500 SUSDC needs 250 WAPS
    let result = client
        .provide_liquidity(ProvideParams {
            owner:      BOB,
            token_a:    SUSDC,
            token_b:    WAPS,
            amount_a:   u(500),
            amount_b:   None,
            min_shares: U256::ZERO,
        })
        .await
        .unwrap();

    assert_eq!(result.amount_b, u(250));
    assert_eq!(result.shares_minted, u(250));
    assert_eq!((result.reserve0, result.reserve1), (u(1250), u(2500)));
}

#[tokio::test]
async fn provide_on_empty_pool_requires_both_amounts() {
    let client = DexClient::spawn(DexState::new());
    client
        .create_pair(CreatePairParams { token_a: WAPS, token_b: SUSDC, fee_rate_bps: 30 })
        .await
        .unwrap();

    let err = client
        .provide_liquidity(ProvideParams {
            owner:      ALICE,
            token_a:    WAPS,
            token_b:    SUSDC,
            amount_a:   u(1000),
            amount_b:   None,
            min_shares: U256::ZERO,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AmountBRequired));
}

#[tokio::test]
async fn simulate_then_convert() {
    let client = seeded().await;

    let sim = client
        .simulate(SimulateParams { token_in: WAPS, token_out: SUSDC, amount_in: u(10) })
        .await
        .unwrap();
    assert_eq!(sim.estimated_out, u(17));
    assert_eq!(sim.fee, u(1));

    let swap = client
        .convert(SwapParams {
            owner:            BOB,
            token_in:         WAPS,
            token_out:        SUSDC,
            amount_in:        u(10),
            max_slippage_bps: 50,
        })
        .await
        .unwrap();

    assert_eq!(swap.amount_out, u(17));
    assert_eq!(swap.min_amount_out, u(17));
    let info = client.pool_info(SUSDC, WAPS).await.unwrap();
    assert_eq!((info.reserve0, info.reserve1), (u(1010), u(1983)));
    assert_eq!(client.balance_of(SUSDC, BOB).await.unwrap(), u(1_000_017));
}

#[tokio::test]
async fn swap_below_minimum_is_rejected_without_side_effects() {
    let client = seeded().await;
    let before = client.snapshot().await.unwrap();

    let err = client.swap(BOB, WAPS, SUSDC, u(10), u(18)).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Dex(DexError::SlippageExceeded { op: Operation::Swap, output, min }) if output == u(17) && min == u(18)
    ));
    assert_eq!(client.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn unknown_pair_is_reported() {
    let client = seeded().await;
    let other = Address::repeat_byte(0x33);

    let err = client.pool_info(WAPS, other).await.unwrap_err();

    assert!(matches!(err, Error::PoolNotFound(a, b) if a == WAPS && b == other));
}

#[tokio::test]
async fn fees_show_up_in_positions_and_claim() {
    let client = seeded().await;
    // fee = 3 over 1000 shares: 2 payable, 1 unit of dust
    client.swap(BOB, WAPS, SUSDC, u(1000), U256::ZERO).await.unwrap();

    let fees = client.my_fees(ALICE).await.unwrap();
    assert_eq!(fees.positions.len(), 1);
    assert_eq!(fees.positions[0].pending_fee0, u(2));
    assert_eq!(fees.totals.get(&WAPS), Some(&u(2)));
    assert_eq!(fees.totals.get(&SUSDC), Some(&U256::ZERO));

    let claim = client.claim_fees(ALICE, SUSDC, WAPS).await.unwrap();
    assert_eq!((claim.fee0, claim.fee1), (u(2), U256::ZERO));
    assert!(client.my_fees(ALICE).await.unwrap().totals.values().all(|v| v.is_zero()));
    assert!(client.my_positions(BOB).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_maps_amounts_to_caller_order() {
    let client = seeded().await;

    let result = client
        .remove_liquidity(RemoveParams {
            owner:        ALICE,
            token_a:      SUSDC,
            token_b:      WAPS,
            shares:       u(500),
            min_amount_a: u(1000),
            min_amount_b: u(500),
        })
        .await
        .unwrap();

    assert_eq!((result.amount_a, result.amount_b), (u(1000), u(500)));
    let position = client.position(ALICE, WAPS, SUSDC).await.unwrap().unwrap();
    assert_eq!(position.shares, u(500));
    assert_eq!(position.pool_share_pct, 100.0);
}

#[tokio::test]
async fn failed_remove_surfaces_engine_error() {
    let client = seeded().await;

    let err = client
        .remove_liquidity(RemoveParams {
            owner:        BOB,
            token_a:      WAPS,
            token_b:      SUSDC,
            shares:       u(1),
            min_amount_a: U256::ZERO,
            min_amount_b: U256::ZERO,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Dex(DexError::InsufficientLiquidity { .. })));
}

#[tokio::test]
async fn concurrent_swaps_are_serialized() {
    let client = seeded().await;
    let before = client.pool_info(WAPS, SUSDC).await.unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.swap(BOB, WAPS, SUSDC, u(10), U256::ZERO).await })
        })
        .collect();
    let mut received = U256::ZERO;
    for handle in handles {
        received += handle.await.unwrap().unwrap().amount_out;
    }

    let after = client.pool_info(WAPS, SUSDC).await.unwrap();
    assert_eq!(after.reserve0, before.reserve0 + u(200));
    assert_eq!(after.reserve1, before.reserve1 - received);
    assert!(after.reserve0 * after.reserve1 >= before.reserve0 * before.reserve1);
    let swaps = client
        .events(Some(after.pair))
        .await
        .unwrap()
        .into_iter()
        .filter(|e| matches!(e, DexEvent::Swapped { .. }))
        .count();
    assert_eq!(swaps, 20);
}

#[tokio::test]
async fn state_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    let client = seeded().await;
    client.swap(BOB, WAPS, SUSDC, u(10), U256::ZERO).await.unwrap();

    let snapshot = client.snapshot().await.unwrap();
    snapshot.save(&path).unwrap();
    let restored = DexState::load(&path).unwrap();

    assert_eq!(restored, snapshot);
    let resumed = DexClient::spawn(restored);
    let info = resumed.pool_info(WAPS, SUSDC).await.unwrap();
    assert_eq!((info.reserve0, info.reserve1), (u(1010), u(1983)));
}

#[tokio::test]
async fn missing_state_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let state = DexState::load(dir.path().join("absent.json")).unwrap();
    assert_eq!(state, DexState::new());
}

#[tokio::test]
async fn zero_input_is_rejected() {
    let client = seeded().await;
    let before = client.snapshot().await.unwrap();

    let err = client.swap(BOB, WAPS, SUSDC, U256::ZERO, U256::ZERO).await.unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(client.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn engine_errors_keep_their_operation() {
    let client = seeded().await;

    // one unit of input floors to zero effective input
    let err = client.swap(BOB, WAPS, SUSDC, u(1), U256::ZERO).await.unwrap_err();

    assert!(matches!(err, Error::Dex(DexError::InvalidAmount { op: Operation::Swap, .. })));
}
