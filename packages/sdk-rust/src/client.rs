//! [`DexClient`] — the main entry point for integrations.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use simple_dex::{DexEvent, Position, SimpleDex, TokenLedger};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::{
    error::{Error, Result},
    math::{compute_amount_b, min_amount_out, pending_fees_for_position, ratio, simulate_detailed, spot_price},
    state::DexState,
    types::{
        ClaimResult, CreatePairParams, CreatePairResult, FeeSummary, PoolInfo, PositionInfo, ProvideParams,
        ProvideResult, RemoveParams, RemoveResult, SimulateParams, SimulateResult, SwapParams, SwapResult,
    },
};

type Job = Box<dyn FnOnce(&mut DexState) + Send + 'static>;

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async SimpleDEX client.
///
/// A single background task owns the [`DexState`] and runs one job at a
/// time, so every call is atomic with respect to every other. Clones share
/// the same task; it stops once the last clone is dropped.
///
/// ```rust,no_run
/// # use simple_dex_sdk::{DexClient, DexState, SimulateParams};
/// # use alloy_primitives::{address, U256};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DexClient::spawn(DexState::load("dex-state.json")?);
/// let waps  = address!("0xADb64775Fc297B7D3762c6CB7fA0D41099Cd2d73");
/// let susdc = address!("0x17f5c0cEc8c989566ED3b0f6177CcC69c4429C54");
/// let sim = client.simulate(SimulateParams {
///     token_in: waps, token_out: susdc, amount_in: U256::from(1_000_000u64),
/// }).await?;
/// println!("Estimated out: {}", sim.estimated_out);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DexClient {
    jobs: mpsc::UnboundedSender<Job>,
}

impl DexClient {
    /// Move `state` into a new background task. Must be called inside a
    /// tokio runtime.
    pub fn spawn(state: DexState) -> Self {
        let (jobs, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            let mut state = state;
            debug!("Started task 'dex-state'");
            while let Some(job) = rx.recv().await {
                job(&mut state);
            }
            debug!("Stopped task 'dex-state'");
        });
        Self { jobs }
    }

    /// Run `f` on the owned state and wait for its result.
    async fn call<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DexState) -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move |state: &mut DexState| {
            // The caller may have given up waiting
            let _ = tx.send(f(state));
        });
        self.jobs.send(job).map_err(|_| Error::ClientClosed)?;
        rx.await.map_err(|_| Error::ClientClosed)?
    }

    // ── Write operations ──────────────────────────────────────────────────────

    /// Create a new, empty pool for a token pair.
    pub async fn create_pair(&self, params: CreatePairParams) -> Result<CreatePairResult> {
        self.call(move |state| {
            let DexState { factory, events, .. } = state;
            let pair = factory.create_pair_with_fee(events, params.token_a, params.token_b, params.fee_rate_bps)?;
            Ok(CreatePairResult {
                pair,
                token0:       params.token_a,
                token1:       params.token_b,
                fee_rate_bps: params.fee_rate_bps,
                pair_count:   factory.all_pairs_length(),
            })
        })
        .await
    }

    /// Credit `amount` of `token` to `to`; returns the new balance.
    pub async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<U256> {
        self.call(move |state| {
            state.ledger.mint(token, to, amount)?;
            Ok(state.ledger.balance_of(&token, &to))
        })
        .await
    }

    /// Deposit tokens into a pool and receive liquidity shares.
    ///
    /// The pool is found for the token pair in either order. If
    /// `params.amount_b` is `None` the proportional amount is computed from
    /// live reserves inside the same job as the deposit.
    pub async fn provide_liquidity(&self, params: ProvideParams) -> Result<ProvideResult> {
        self.call(move |state| {
            let (dex, mut ctx) = state.dex_mut(&params.token_a, &params.token_b)?;
            let a_is_0 = dex.token0() == params.token_a;
            let (reserve0, reserve1) = dex.get_reserves();
            let (reserve_a, reserve_b) = if a_is_0 { (reserve0, reserve1) } else { (reserve1, reserve0) };

            let amount_b = compute_amount_b(
                params.amount_a, params.amount_b,
                reserve_a, reserve_b, dex.total_liquidity(),
            )?;
            let (amount0, amount1) = if a_is_0 { (params.amount_a, amount_b) } else { (amount_b, params.amount_a) };

            let outcome = dex.add_liquidity_checked(&mut ctx, params.owner, amount0, amount1, params.min_shares)?;
            Ok(ProvideResult {
                pair:          dex.address(),
                amount_a:      params.amount_a,
                amount_b,
                shares_minted: outcome.shares_minted,
                reserve0:      outcome.reserve0,
                reserve1:      outcome.reserve1,
            })
        })
        .await
    }

    /// Burn shares and withdraw the proportional reserves.
    pub async fn remove_liquidity(&self, params: RemoveParams) -> Result<RemoveResult> {
        self.call(move |state| {
            let (dex, mut ctx) = state.dex_mut(&params.token_a, &params.token_b)?;
            let a_is_0 = dex.token0() == params.token_a;
            let (min0, min1) = if a_is_0 {
                (params.min_amount_a, params.min_amount_b)
            } else {
                (params.min_amount_b, params.min_amount_a)
            };

            let out = dex.remove_liquidity_checked(&mut ctx, params.owner, params.shares, min0, min1)?;
            let ((amount_a, amount_b), (forfeited_fee_a, forfeited_fee_b)) = if a_is_0 {
                ((out.amount0, out.amount1), (out.forfeited_fee0, out.forfeited_fee1))
            } else {
                ((out.amount1, out.amount0), (out.forfeited_fee1, out.forfeited_fee0))
            };
            Ok(RemoveResult {
                pair: dex.address(),
                shares: params.shares,
                amount_a,
                amount_b,
                forfeited_fee_a,
                forfeited_fee_b,
            })
        })
        .await
    }

    /// Swap with an explicit minimum output. `min_amount_out = 0` disables
    /// the guard.
    pub async fn swap(
        &self,
        owner:          Address,
        token_in:       Address,
        token_out:      Address,
        amount_in:      U256,
        min_amount_out: U256,
    ) -> Result<SwapResult> {
        self.call(move |state| execute_swap(state, owner, token_in, token_out, amount_in, MinOut::Exact(min_amount_out)))
            .await
    }

    /// Swap one token for another with a slippage tolerance.
    ///
    /// The bound is derived from a simulation run in the same job as the
    /// swap. Pass `max_slippage_bps = 0` to disable the guard.
    pub async fn convert(&self, params: SwapParams) -> Result<SwapResult> {
        self.call(move |state| {
            let bound = MinOut::Slippage(params.max_slippage_bps);
            execute_swap(state, params.owner, params.token_in, params.token_out, params.amount_in, bound)
        })
        .await
    }

    /// Pay out the fees accrued to `owner`'s position in a pool.
    pub async fn claim_fees(&self, owner: Address, token_a: Address, token_b: Address) -> Result<ClaimResult> {
        self.call(move |state| {
            let (dex, mut ctx) = state.dex_mut(&token_a, &token_b)?;
            let outcome = dex.claim_fees(&mut ctx, owner)?;
            Ok(ClaimResult {
                pair:   dex.address(),
                token0: dex.token0(),
                token1: dex.token1(),
                fee0:   outcome.fee0,
                fee1:   outcome.fee1,
            })
        })
        .await
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// Simulate a swap without executing it.
    pub async fn simulate(&self, params: SimulateParams) -> Result<SimulateResult> {
        self.call(move |state| {
            let dex = state.dex(&params.token_in, &params.token_out)?;
            simulate_detailed(dex.pool(), &params.token_in, params.amount_in)
        })
        .await
    }

    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.call(move |state| Ok(state.ledger.balance_of(&token, &owner))).await
    }

    /// Every non-zero balance held by `owner`.
    pub async fn balances(&self, owner: Address) -> Result<Vec<(Address, U256)>> {
        self.call(move |state| Ok(state.ledger.holdings(&owner))).await
    }

    /// Pool reserves, liquidity, fee tier and spot price.
    pub async fn pool_info(&self, token_a: Address, token_b: Address) -> Result<PoolInfo> {
        self.call(move |state| Ok(pool_info(state.dex(&token_a, &token_b)?))).await
    }

    /// Every pool, in creation order.
    pub async fn pairs(&self) -> Result<Vec<PoolInfo>> {
        self.call(|state| Ok(state.factory.pairs().map(pool_info).collect())).await
    }

    /// `owner`'s position in one pool, if it holds shares.
    pub async fn position(&self, owner: Address, token_a: Address, token_b: Address) -> Result<Option<PositionInfo>> {
        self.call(move |state| {
            let dex = state.dex(&token_a, &token_b)?;
            match dex.position(&owner).filter(|p| !p.is_empty()) {
                Some(position) => position_info(dex, position).map(Some),
                None => Ok(None),
            }
        })
        .await
    }

    /// All positions of `owner` with pending fee calculations.
    pub async fn my_positions(&self, owner: Address) -> Result<Vec<PositionInfo>> {
        self.call(move |state| collect_positions(state, &owner)).await
    }

    /// Claimable fees across every position of `owner`, totalled per token.
    pub async fn my_fees(&self, owner: Address) -> Result<FeeSummary> {
        self.call(move |state| {
            let positions = collect_positions(state, &owner)?;
            let mut totals: BTreeMap<Address, U256> = BTreeMap::new();
            for p in &positions {
                *totals.entry(p.token0).or_default() += p.total_fee0;
                *totals.entry(p.token1).or_default() += p.total_fee1;
            }
            Ok(FeeSummary { positions, totals })
        })
        .await
    }

    /// Event log, optionally restricted to one pair.
    pub async fn events(&self, pair: Option<Address>) -> Result<Vec<DexEvent>> {
        self.call(move |state| {
            Ok(state.events.iter().filter(|e| pair.map_or(true, |p| e.pair() == p)).cloned().collect())
        })
        .await
    }

    /// Copy of the full state, e.g. for [`DexState::save`].
    pub async fn snapshot(&self) -> Result<DexState> {
        self.call(|state| Ok(state.clone())).await
    }
}

// ─── Job bodies ───────────────────────────────────────────────────────────────

/// Output floor for a swap job.
enum MinOut {
    Exact(U256),
    /// Derived from the simulated output
    Slippage(u16),
}

fn execute_swap(
    state:     &mut DexState,
    owner:     Address,
    token_in:  Address,
    token_out: Address,
    amount_in: U256,
    bound:     MinOut,
) -> Result<SwapResult> {
    let (dex, mut ctx) = state.dex_mut(&token_in, &token_out)?;
    let sim = simulate_detailed(dex.pool(), &token_in, amount_in)?;
    let min_amount_out = match bound {
        MinOut::Exact(min) => min,
        MinOut::Slippage(bps) => min_amount_out(sim.estimated_out, bps),
    };

    let outcome = dex.swap(&mut ctx, owner, token_in, amount_in, min_amount_out)?;
    Ok(SwapResult {
        pair:           dex.address(),
        token_in,
        token_out,
        amount_in,
        amount_out:     outcome.amount_out,
        estimated_out:  sim.estimated_out,
        min_amount_out,
        fee:            outcome.fee,
    })
}

fn pool_info(dex: &SimpleDex) -> PoolInfo {
    let pool = dex.pool();
    PoolInfo {
        pair:             pool.address,
        token0:           pool.token0,
        token1:           pool.token1,
        reserve0:         pool.reserve0,
        reserve1:         pool.reserve1,
        total_liquidity:  pool.total_liquidity,
        fee_rate_bps:     pool.fee_rate_bps,
        spot_price:       spot_price(pool.reserve0, pool.reserve1),
        accumulated_fee0: pool.accumulated_fee0,
        accumulated_fee1: pool.accumulated_fee1,
    }
}

fn position_info(dex: &SimpleDex, position: &Position) -> Result<PositionInfo> {
    let pool = dex.pool();
    let (pending0, pending1) = pending_fees_for_position(position, pool)?;
    Ok(PositionInfo {
        pair:           pool.address,
        owner:          position.owner,
        token0:         pool.token0,
        token1:         pool.token1,
        shares:         position.shares,
        pool_share_pct: ratio(position.shares, pool.total_liquidity) * 100.0,
        fees_owed0:     position.fees_owed0,
        fees_owed1:     position.fees_owed1,
        pending_fee0:   pending0,
        pending_fee1:   pending1,
        total_fee0:     position.fees_owed0.saturating_add(pending0),
        total_fee1:     position.fees_owed1.saturating_add(pending1),
    })
}

fn collect_positions(state: &DexState, owner: &Address) -> Result<Vec<PositionInfo>> {
    state
        .factory
        .pairs()
        .filter_map(|dex| dex.position(owner).filter(|p| !p.is_empty()).map(|p| position_info(dex, p)))
        .collect()
}
