#![allow(dead_code)]

use simple_dex::{
    alloy_primitives::{Address, U256},
    AddLiquidityOutcome, ClaimOutcome, Context, DexEvent, InMemoryLedger, Pool, RemoveLiquidityOutcome,
    Result, SimpleDex, SwapOutcome, TokenLedger, FEE_RATE_DEFAULT_BPS,
};

pub const TOKEN0: Address = Address::repeat_byte(0x10);
pub const TOKEN1: Address = Address::repeat_byte(0x20);
pub const STRANGER_TOKEN: Address = Address::repeat_byte(0x30);

pub const ALICE: Address = Address::repeat_byte(0xa1);
pub const BOB: Address = Address::repeat_byte(0xb0);
pub const CAROL: Address = Address::repeat_byte(0xc0);

pub fn u(n: u64) -> U256 {
    U256::from(n)
}

/// A single pool wired to an in-memory ledger and an event log.
#[derive(Debug, Clone)]
pub struct Harness {
    pub dex: SimpleDex,
    pub ledger: InMemoryLedger,
    pub events: Vec<DexEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dex: SimpleDex::new(Pool::new(TOKEN0, TOKEN1, FEE_RATE_DEFAULT_BPS)),
            ledger: InMemoryLedger::new(),
            events: Vec::new(),
        }
    }

    /// Credit `who` with `amount0` of token0 and `amount1` of token1.
    pub fn fund(&mut self, who: Address, amount0: u64, amount1: u64) -> &mut Self {
        self.ledger.mint(TOKEN0, who, u(amount0)).unwrap();
        self.ledger.mint(TOKEN1, who, u(amount1)).unwrap();
        self
    }

    pub fn add(&mut self, who: Address, amount0: u64, amount1: u64) -> Result<AddLiquidityOutcome> {
        let mut ctx = Context::new(&mut self.ledger, &mut self.events);
        self.dex.add_liquidity(&mut ctx, who, u(amount0), u(amount1))
    }

    pub fn remove(&mut self, who: Address, shares: U256) -> Result<RemoveLiquidityOutcome> {
        let mut ctx = Context::new(&mut self.ledger, &mut self.events);
        self.dex.remove_liquidity(&mut ctx, who, shares)
    }

    pub fn swap(&mut self, who: Address, token_in: Address, amount_in: u64, min_out: u64) -> Result<SwapOutcome> {
        let mut ctx = Context::new(&mut self.ledger, &mut self.events);
        self.dex.swap(&mut ctx, who, token_in, u(amount_in), u(min_out))
    }

    pub fn claim(&mut self, who: Address) -> Result<ClaimOutcome> {
        let mut ctx = Context::new(&mut self.ledger, &mut self.events);
        self.dex.claim_fees(&mut ctx, who)
    }

    pub fn balance(&self, token: Address, who: Address) -> U256 {
        self.ledger.balance_of(&token, &who)
    }

    pub fn reserves(&self) -> (U256, U256) {
        self.dex.get_reserves()
    }

    /// Accounting invariants that must hold after every operation.
    pub fn assert_invariants(&self) {
        let pool = self.dex.pool();
        let share_sum = self.dex.positions().fold(U256::ZERO, |acc, p| acc + p.shares);
        assert_eq!(share_sum, pool.total_liquidity, "sum of shares must equal total liquidity");

        let empty = pool.reserve0.is_zero() && pool.reserve1.is_zero();
        let funded = !pool.reserve0.is_zero() && !pool.reserve1.is_zero();
        assert!(empty || funded, "reserves must be both zero or both positive: {:?}", pool.reserves());
        assert_eq!(pool.total_liquidity.is_zero(), empty, "liquidity is zero iff reserves are zero");

        assert_eq!(self.balance(TOKEN0, pool.address), pool.reserve0, "pair balance of token0");
        assert_eq!(self.balance(TOKEN1, pool.address), pool.reserve1, "pair balance of token1");

        for position in self.dex.positions().filter(|p| p.shares.is_zero()) {
            assert!(position.fees_owed0.is_zero() && position.fees_owed1.is_zero());
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
