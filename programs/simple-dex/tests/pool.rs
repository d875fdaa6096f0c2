mod common;

use common::*;
use rstest::{fixture, rstest};
use simple_dex::{alloy_primitives::U256, Context, DexError, DexEvent, LedgerError, Operation};

/// Alice seeded the pool at 1000 : 2000.
#[fixture]
fn seeded() -> Harness {
    let mut h = Harness::new();
    h.fund(ALICE, 1_000_000, 1_000_000).fund(BOB, 1_000_000, 1_000_000);
    h.add(ALICE, 1000, 2000).unwrap();
    h
}

/// Power-of-two liquidity so per-share fee growth divides exactly.
#[fixture]
fn binary() -> Harness {
    let mut h = Harness::new();
    h.fund(ALICE, 1_000_000, 1_000_000)
        .fund(BOB, 1_000_000, 1_000_000)
        .fund(CAROL, 1_000_000, 1_000_000);
    h.add(ALICE, 1024, 2048).unwrap();
    h
}

// ─── add_liquidity ─────────────────────────────────────────────────────────

#[rstest]
fn first_deposit_mints_amount0_shares() {
    let mut h = Harness::new();
    h.fund(ALICE, 1000, 2000);

    let outcome = h.add(ALICE, 1000, 2000).unwrap();

    assert_eq!(outcome.shares_minted, u(1000));
    assert_eq!(h.reserves(), (u(1000), u(2000)));
    assert_eq!(h.dex.total_liquidity(), u(1000));
    assert_eq!(h.dex.get_user_liquidity(&ALICE), u(1000));
    assert_eq!(h.balance(TOKEN0, ALICE), U256::ZERO);
    assert_eq!(h.balance(TOKEN1, ALICE), U256::ZERO);
    assert_eq!(
        h.events,
        vec![DexEvent::LiquidityAdded {
            pair: h.dex.address(),
            provider: ALICE,
            amount0: u(1000),
            amount1: u(2000),
            shares_minted: u(1000),
        }]
    );
    h.assert_invariants();
}

#[rstest]
fn proportional_deposit_uses_smaller_ratio(mut seeded: Harness) {
    // 100/1000 of token0 but 250/2000 of token1: the token0 ratio wins.
    let outcome = seeded.add(BOB, 100, 250).unwrap();

    assert_eq!(outcome.shares_minted, u(100));
    assert_eq!(seeded.reserves(), (u(1100), u(2250)));
    assert_eq!(seeded.dex.total_liquidity(), u(1100));
    seeded.assert_invariants();
}

#[rstest]
#[case(0, 2000)]
#[case(1000, 0)]
#[case(0, 0)]
fn zero_deposit_is_rejected(#[case] amount0: u64, #[case] amount1: u64) {
    let mut h = Harness::new();
    h.fund(ALICE, 1000, 2000);

    let err = h.add(ALICE, amount0, amount1).unwrap_err();

    assert!(matches!(err, DexError::InvalidAmount { op: Operation::AddLiquidity, .. }));
    assert_eq!(h.reserves(), (U256::ZERO, U256::ZERO));
    assert!(h.events.is_empty());
}

#[rstest]
fn dust_deposit_that_mints_nothing_is_rejected(mut seeded: Harness) {
    // floor(1 × 1000 / 2000) = 0 shares on the token1 side
    let err = seeded.add(BOB, 1, 1).unwrap_err();

    assert!(matches!(err, DexError::InvalidAmount { op: Operation::AddLiquidity, .. }));
    assert_eq!(seeded.reserves(), (u(1000), u(2000)));
}

#[rstest]
fn min_shares_guard(mut seeded: Harness) {
    let before = seeded.clone();
    let mut ctx = Context::new(&mut seeded.ledger, &mut seeded.events);

    let err = seeded.dex.add_liquidity_checked(&mut ctx, BOB, u(100), u(200), u(101)).unwrap_err();

    assert_eq!(err, DexError::SlippageExceeded { op: Operation::AddLiquidity, output: u(100), min: u(101) });
    assert_eq!(seeded.dex, before.dex);
    assert_eq!(seeded.ledger, before.ledger);
}

#[rstest]
fn failed_transfer_rolls_back_deposit() {
    let mut h = Harness::new();
    h.ledger.mint(TOKEN0, ALICE, u(1000)).unwrap();

    let err = h.add(ALICE, 1000, 2000).unwrap_err();

    match err {
        DexError::TransferFailed { op, source: LedgerError::InsufficientBalance { token, .. } } => {
            assert_eq!(op, Operation::AddLiquidity);
            assert_eq!(token, TOKEN1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.balance(TOKEN0, ALICE), u(1000));
    assert_eq!(h.balance(TOKEN0, h.dex.address()), U256::ZERO);
    assert_eq!(h.dex.total_liquidity(), U256::ZERO);
    assert!(h.dex.position(&ALICE).is_none());
    assert!(h.events.is_empty());
}

// ─── remove_liquidity ──────────────────────────────────────────────────────

#[rstest]
fn removing_more_than_owned_fails(mut seeded: Harness) {
    let err = seeded.remove(ALICE, u(1001)).unwrap_err();

    assert_eq!(err, DexError::InsufficientLiquidity { requested: u(1001), owned: u(1000) });
    assert_eq!(seeded.reserves(), (u(1000), u(2000)));
    assert_eq!(seeded.dex.get_user_liquidity(&ALICE), u(1000));
}

#[rstest]
fn removing_without_position_fails(mut seeded: Harness) {
    let err = seeded.remove(BOB, u(1)).unwrap_err();
    assert_eq!(err, DexError::InsufficientLiquidity { requested: u(1), owned: U256::ZERO });
}

#[rstest]
fn removing_zero_shares_fails(mut seeded: Harness) {
    let err = seeded.remove(ALICE, U256::ZERO).unwrap_err();
    assert!(matches!(err, DexError::InvalidAmount { op: Operation::RemoveLiquidity, .. }));
}

#[rstest]
fn partial_removal_is_pro_rata(mut seeded: Harness) {
    let outcome = seeded.remove(ALICE, u(250)).unwrap();

    assert_eq!((outcome.amount0, outcome.amount1), (u(250), u(500)));
    assert_eq!(seeded.reserves(), (u(750), u(1500)));
    assert_eq!(seeded.dex.total_liquidity(), u(750));
    assert_eq!(seeded.balance(TOKEN0, ALICE), u(1_000_000 - 750));
    assert_eq!(
        seeded.events.last(),
        Some(&DexEvent::LiquidityRemoved {
            pair: seeded.dex.address(),
            provider: ALICE,
            shares: u(250),
            amount0: u(250),
            amount1: u(500),
        })
    );
    seeded.assert_invariants();
}

#[rstest]
fn round_trip_never_returns_more_than_deposited(mut seeded: Harness) {
    let minted = seeded.add(BOB, 100, 250).unwrap().shares_minted;
    let out = seeded.remove(BOB, minted).unwrap();

    assert!(out.amount0 <= u(100));
    assert!(out.amount1 <= u(250));
    // the unmatched token1 excess stays with the pool
    assert_eq!((out.amount0, out.amount1), (u(100), u(204)));
    seeded.assert_invariants();
}

#[rstest]
fn last_provider_exit_empties_pool(mut seeded: Harness) {
    seeded.swap(BOB, TOKEN0, 100, 0).unwrap();
    seeded.remove(ALICE, u(1000)).unwrap();

    let pool = seeded.dex.pool();
    assert_eq!(seeded.reserves(), (U256::ZERO, U256::ZERO));
    assert_eq!(pool.total_liquidity, U256::ZERO);
    // the unclaimed fee left with the reserves but stays on the running total
    assert_eq!((pool.accumulated_fee0, pool.accumulated_fee1), (u(1), U256::ZERO));
    assert_eq!(seeded.dex.get_claimable_fees(&ALICE).unwrap(), (U256::ZERO, U256::ZERO));
    seeded.assert_invariants();

    // An emptied pool takes a fresh first deposit at a new ratio
    let outcome = seeded.add(BOB, 500, 500).unwrap();
    assert_eq!(outcome.shares_minted, u(500));
    seeded.assert_invariants();
}

#[rstest]
fn min_amounts_guard_withdrawal(mut seeded: Harness) {
    let mut ctx = Context::new(&mut seeded.ledger, &mut seeded.events);

    let err = seeded.dex.remove_liquidity_checked(&mut ctx, ALICE, u(100), u(100), u(201)).unwrap_err();

    assert_eq!(err, DexError::SlippageExceeded { op: Operation::RemoveLiquidity, output: u(200), min: u(201) });
    assert_eq!(seeded.reserves(), (u(1000), u(2000)));
}

// ─── swap ──────────────────────────────────────────────────────────────────

#[rstest]
fn swap_reference_trade(mut seeded: Harness) {
    assert_eq!(seeded.dex.get_swap_amount(&TOKEN0, u(10)).unwrap(), u(17));

    let outcome = seeded.swap(BOB, TOKEN0, 10, 0).unwrap();

    assert_eq!(outcome.amount_out, u(17));
    assert_eq!(outcome.fee, u(1));
    assert_eq!(seeded.reserves(), (u(1010), u(1983)));
    assert_eq!(seeded.balance(TOKEN1, BOB), u(1_000_017));
    assert_eq!(seeded.dex.pool().accumulated_fee0, u(1));
    assert_eq!(
        seeded.events.last(),
        Some(&DexEvent::Swapped {
            pair: seeded.dex.address(),
            trader: BOB,
            token_in: TOKEN0,
            amount_in: u(10),
            amount_out: u(17),
        })
    );
    seeded.assert_invariants();
}

#[rstest]
fn swap_in_reverse_direction(mut seeded: Harness) {
    // effective 99, out = 1000·99 / 2099 = 47
    let outcome = seeded.swap(BOB, TOKEN1, 100, 47).unwrap();

    assert_eq!(outcome.amount_out, u(47));
    assert_eq!(outcome.fee, u(1));
    assert_eq!(seeded.reserves(), (u(953), u(2100)));
    assert_eq!(seeded.dex.pool().accumulated_fee1, u(1));
}

#[rstest]
fn slippage_guard_leaves_state_untouched(mut seeded: Harness) {
    let before = seeded.clone();

    let err = seeded.swap(BOB, TOKEN0, 10, 18).unwrap_err();

    assert_eq!(err, DexError::SlippageExceeded { op: Operation::Swap, output: u(17), min: u(18) });
    assert_eq!(seeded.dex, before.dex);
    assert_eq!(seeded.ledger, before.ledger);
    assert_eq!(seeded.events, before.events);
}

#[rstest]
fn swap_rejects_unknown_token(mut seeded: Harness) {
    let err = seeded.swap(BOB, STRANGER_TOKEN, 10, 0).unwrap_err();
    assert_eq!(err, DexError::UnknownAsset { op: Operation::Swap, token: STRANGER_TOKEN });

    let err = seeded.dex.get_swap_amount(&STRANGER_TOKEN, u(10)).unwrap_err();
    assert_eq!(err, DexError::UnknownAsset { op: Operation::GetSwapAmount, token: STRANGER_TOKEN });
}

#[rstest]
fn swap_rejects_zero_input(mut seeded: Harness) {
    let err = seeded.swap(BOB, TOKEN0, 0, 0).unwrap_err();
    assert!(matches!(err, DexError::InvalidAmount { op: Operation::Swap, .. }));
}

#[rstest]
fn swap_rejects_output_that_rounds_to_zero(mut seeded: Harness) {
    // effective input floors to zero
    let err = seeded.swap(BOB, TOKEN0, 1, 0).unwrap_err();
    assert!(matches!(err, DexError::InvalidAmount { op: Operation::Swap, .. }));
    assert_eq!(seeded.reserves(), (u(1000), u(2000)));
}

#[rstest]
fn swap_on_empty_pool_fails() {
    let mut h = Harness::new();
    h.fund(BOB, 100, 100);

    assert_eq!(h.swap(BOB, TOKEN0, 10, 0).unwrap_err(), DexError::EmptyPool { op: Operation::Swap });
    assert_eq!(
        h.dex.get_swap_amount(&TOKEN0, u(10)).unwrap_err(),
        DexError::EmptyPool { op: Operation::GetSwapAmount }
    );
}

#[rstest]
fn swap_without_balance_rolls_back(mut seeded: Harness) {
    let before = seeded.clone();

    let err = seeded.swap(CAROL, TOKEN0, 10, 0).unwrap_err();

    assert!(matches!(err, DexError::TransferFailed { op: Operation::Swap, .. }));
    assert_eq!(seeded.dex, before.dex);
    assert_eq!(seeded.ledger, before.ledger);
}

#[rstest]
fn swap_grows_constant_product(mut seeded: Harness) {
    let mut k = seeded.reserves().0 * seeded.reserves().1;
    for (token, amount) in [(TOKEN0, 10), (TOKEN1, 333), (TOKEN0, 5_000), (TOKEN1, 7)] {
        seeded.swap(BOB, token, amount, 0).unwrap();
        let (r0, r1) = seeded.reserves();
        assert!(r0 * r1 >= k, "product decreased after selling {amount} of {token}");
        k = r0 * r1;
    }
    seeded.assert_invariants();
}

// ─── fees ──────────────────────────────────────────────────────────────────

#[rstest]
fn claimable_is_zero_for_unknown_provider(seeded: Harness) {
    assert_eq!(seeded.dex.get_claimable_fees(&CAROL).unwrap(), (U256::ZERO, U256::ZERO));
}

#[rstest]
fn claim_pays_fees_out_of_reserves(mut binary: Harness) {
    // fee = 1000 − floor(1000·9970/10000) = 3
    let swap = binary.swap(BOB, TOKEN0, 1000, 0).unwrap();
    assert_eq!(swap.fee, u(3));
    assert_eq!(binary.dex.get_claimable_fees(&ALICE).unwrap(), (u(3), U256::ZERO));

    let (r0, r1) = binary.reserves();
    let balance = binary.balance(TOKEN0, ALICE);
    let claim = binary.claim(ALICE).unwrap();

    assert_eq!((claim.fee0, claim.fee1), (u(3), U256::ZERO));
    assert_eq!(binary.reserves(), (r0 - u(3), r1));
    assert_eq!(binary.balance(TOKEN0, ALICE), balance + u(3));
    assert_eq!(binary.dex.pool().accumulated_fee0, U256::ZERO);
    assert_eq!(
        binary.events.last(),
        Some(&DexEvent::FeesClaimed { pair: binary.dex.address(), provider: ALICE, fee0: u(3), fee1: U256::ZERO })
    );
    binary.assert_invariants();
}

#[rstest]
fn claim_defers_what_a_drawn_down_reserve_cannot_cover() {
    let mut h = Harness::new();
    h.fund(ALICE, 1000, 1000).fund(BOB, 1_000_000, 100_000).fund(CAROL, 10_000, 10_000);
    h.add(ALICE, 1000, 1000).unwrap();

    // token0 fee 3000, then the reverse trade pulls reserve0 down to 21
    h.swap(BOB, TOKEN0, 1_000_000, 0).unwrap();
    h.swap(BOB, TOKEN1, 100_000, 0).unwrap();
    assert_eq!(h.reserves(), (u(21), u(100_002)));
    assert_eq!(h.dex.get_claimable_fees(&ALICE).unwrap(), (u(3000), u(299)));

    let claim = h.claim(ALICE).unwrap();

    // token1 is paid in full, token0 down to a single unit of reserve
    assert_eq!((claim.fee0, claim.fee1), (u(20), u(299)));
    assert_eq!(h.reserves(), (u(1), u(99_703)));
    assert_eq!(h.dex.get_claimable_fees(&ALICE).unwrap(), (u(2980), U256::ZERO));
    assert_eq!(h.dex.pool().accumulated_fee0, u(2980));
    assert_eq!(
        h.events.last(),
        Some(&DexEvent::FeesClaimed { pair: h.dex.address(), provider: ALICE, fee0: u(20), fee1: u(299) })
    );
    h.assert_invariants();

    // nothing payable yet: succeeds quietly
    let events = h.events.len();
    assert_eq!(h.claim(ALICE).unwrap(), simple_dex::ClaimOutcome { fee0: U256::ZERO, fee1: U256::ZERO });
    assert_eq!(h.events.len(), events);

    // refilled reserve pays the deferred 2980 plus the new fee (30, floors to 29)
    h.swap(CAROL, TOKEN0, 10_000, 0).unwrap();
    assert_eq!(h.claim(ALICE).unwrap().fee0, u(3009));
    assert_eq!(h.dex.get_claimable_fees(&ALICE).unwrap(), (U256::ZERO, U256::ZERO));
    h.assert_invariants();
}

#[rstest]
fn second_claim_yields_nothing(mut binary: Harness) {
    binary.swap(BOB, TOKEN0, 1000, 0).unwrap();
    binary.claim(ALICE).unwrap();
    let events = binary.events.len();
    let reserves = binary.reserves();

    let again = binary.claim(ALICE).unwrap();

    assert_eq!((again.fee0, again.fee1), (U256::ZERO, U256::ZERO));
    assert_eq!(binary.events.len(), events, "an empty claim emits no event");
    assert_eq!(binary.reserves(), reserves);
}

#[rstest]
fn claim_without_position_fails(mut binary: Harness) {
    assert_eq!(binary.claim(CAROL).unwrap_err(), DexError::NoLiquidityPosition { provider: CAROL });
}

#[rstest]
fn fees_split_pro_rata_between_providers(mut binary: Harness) {
    assert_eq!(binary.add(BOB, 1024, 2048).unwrap().shares_minted, u(1024));

    // fee = 2000 − floor(2000·9970/10000) = 6, split 3 / 3
    let swap = binary.swap(CAROL, TOKEN1, 2000, 0).unwrap();
    assert_eq!(swap.fee, u(6));

    assert_eq!(binary.dex.get_claimable_fees(&ALICE).unwrap(), (U256::ZERO, u(3)));
    assert_eq!(binary.dex.get_claimable_fees(&BOB).unwrap(), (U256::ZERO, u(3)));
    assert_eq!(binary.claim(BOB).unwrap().fee1, u(3));
    assert_eq!(binary.claim(ALICE).unwrap().fee1, u(3));
    binary.assert_invariants();
}

#[rstest]
fn late_provider_earns_no_past_fees(mut binary: Harness) {
    binary.swap(CAROL, TOKEN0, 1000, 0).unwrap();
    let (r0, r1) = binary.reserves();
    binary.add(BOB, r0.to::<u64>(), r1.to::<u64>()).unwrap();

    assert_eq!(binary.dex.get_claimable_fees(&BOB).unwrap(), (U256::ZERO, U256::ZERO));
    assert_eq!(binary.dex.get_claimable_fees(&ALICE).unwrap(), (u(3), U256::ZERO));
}

#[rstest]
fn topping_up_settles_pending_fees_first(mut binary: Harness) {
    binary.swap(CAROL, TOKEN0, 1000, 0).unwrap();
    let (r0, r1) = binary.reserves();

    // doubles Alice's shares; the fee earned so far must not double with them
    let outcome = binary.add(ALICE, r0.to::<u64>(), r1.to::<u64>()).unwrap();
    assert_eq!(outcome.shares_minted, u(1024));

    let position = binary.dex.position(&ALICE).unwrap();
    assert_eq!(position.fees_owed0, u(3));
    assert_eq!(binary.dex.get_claimable_fees(&ALICE).unwrap(), (u(3), U256::ZERO));
    assert_eq!(binary.claim(ALICE).unwrap().fee0, u(3));
}

#[rstest]
fn closing_position_forfeits_unclaimed_fees(mut binary: Harness) {
    binary.add(BOB, 1024, 2048).unwrap();
    binary.swap(CAROL, TOKEN1, 2000, 0).unwrap();

    let outcome = binary.remove(BOB, u(1024)).unwrap();

    assert_eq!((outcome.forfeited_fee0, outcome.forfeited_fee1), (U256::ZERO, u(3)));
    assert_eq!(binary.dex.get_claimable_fees(&BOB).unwrap(), (U256::ZERO, U256::ZERO));
    assert_eq!(binary.claim(BOB).unwrap_err(), DexError::NoLiquidityPosition { provider: BOB });
    // forfeits are undistributed, only claims reduce the running total
    assert_eq!(binary.dex.pool().accumulated_fee1, u(6));
    // Alice's share is unaffected
    assert_eq!(binary.claim(ALICE).unwrap().fee1, u(3));
    binary.assert_invariants();
}

#[rstest]
fn partial_removal_keeps_settled_fees(mut binary: Harness) {
    binary.swap(CAROL, TOKEN0, 1000, 0).unwrap();

    let outcome = binary.remove(ALICE, u(512)).unwrap();

    assert_eq!((outcome.forfeited_fee0, outcome.forfeited_fee1), (U256::ZERO, U256::ZERO));
    assert_eq!(binary.dex.get_claimable_fees(&ALICE).unwrap(), (u(3), U256::ZERO));
    binary.assert_invariants();
}

#[rstest]
fn fee_dust_is_not_distributed() {
    let mut h = Harness::new();
    h.fund(ALICE, 1_000_000, 1_000_000).fund(BOB, 1_000_000, 1_000_000);
    h.add(ALICE, 1000, 2000).unwrap();

    // fee of 3 over 1000 shares floors to 2 payable units
    h.swap(BOB, TOKEN0, 1000, 0).unwrap();

    assert_eq!(h.dex.pool().accumulated_fee0, u(3));
    assert_eq!(h.dex.get_claimable_fees(&ALICE).unwrap(), (u(2), U256::ZERO));
}
