mod config;

use std::path::PathBuf;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::json;
use simple_dex::{DexEvent, FEE_RATE_DEFAULT_BPS, FEE_RATE_MAX_BPS, FEE_RATE_MIN_BPS};
use simple_dex_sdk::{
    CreatePairParams, DexClient, DexState, PositionInfo, ProvideParams, RemoveParams, SimulateParams, SwapParams,
};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TokenRegistry, DEFAULT_STATE_PATH};

// ─── Version banner ───────────────────────────────────────────────────────────

/// Print the SimpleDEX banner to stdout.
fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  SimpleDEX  v{ver}  ·  constant-product pools (x·y=k)");
    println!("  {}", "─".repeat(62));
    println!("  State     {DEFAULT_STATE_PATH}  (override with --state)");
    println!("  Fees      0.30% default, 0.01%–1.00% per pair  ·  kept in the pool for LPs");
    println!("  Tokens    WAPS, SUSDC built in; add more under [tokens] in simple-dex.toml");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// SimpleDEX — constant-product liquidity pools with per-share fee accrual.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   SIMPLE_DEX_STATE    — path to the JSON state file
///   SIMPLE_DEX_ACCOUNT  — address acting as trader / liquidity provider
///   SIMPLE_DEX_CONFIG   — path to a TOML config file
#[derive(Parser)]
#[command(
    name        = "simple-dex",
    version     = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"), "\n",
        "Pricing:      x·y=k, output = r_out·Δx' / (r_in + Δx')\n",
        "Fee range:    1–100 bps per pair  (default 30 = 0.30%)\n",
        "Fee payout:   Q64.64 fee-per-share accumulator\n",
        "License:      MIT",
    ),
    about   = "Constant-product DEX — create pairs, provide liquidity, swap and claim fees.",
    after_help = "\
ENVIRONMENT:
  SIMPLE_DEX_STATE     State file  [default: simple-dex-state.json]
  SIMPLE_DEX_ACCOUNT   Acting address (required by write commands)
  SIMPLE_DEX_CONFIG    TOML config  [default: ./simple-dex.toml if present]
  RUST_LOG             Log filter, e.g. simple_dex=debug  [default: warn]

QUICK START:
  simple-dex create-pair      --pair WAPS-SUSDC
  simple-dex mint             --token WAPS  --amount 1000000
  simple-dex mint             --token SUSDC --amount 2000000
  simple-dex provide          --pair WAPS-SUSDC --amount 1000 --amount-b 2000
  simple-dex simulate         --in WAPS --out SUSDC --amount 10
  simple-dex convert          --in WAPS --out SUSDC --amount 10
  simple-dex my-fees"
)]
struct Cli {
    /// Path to the JSON state file
    #[arg(long, global = true, value_name = "PATH", env = "SIMPLE_DEX_STATE")]
    state: Option<PathBuf>,

    /// Address acting as trader / liquidity provider
    #[arg(long, global = true, value_name = "ADDRESS", env = "SIMPLE_DEX_ACCOUNT")]
    account: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH", env = "SIMPLE_DEX_CONFIG")]
    config: Option<PathBuf>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new x·y=k pool for a token pair
    ///
    /// One pool per unordered pair: WAPS-SUSDC and SUSDC-WAPS are the same
    /// pool. The pool starts empty; the first deposit sets its price.
    #[command(
        after_help = "\
EXAMPLES:
  # Create WAPS/SUSDC with the default 0.30% fee
  simple-dex create-pair --pair WAPS-SUSDC

  # Lower fee tier for a stable pair
  simple-dex create-pair --pair <tokenA>-<tokenB> --fee-bps 5

NOTES:
  Fee range: 1–100 bps (0.01%–1.00%). Default from config or 30 bps."
    )]
    CreatePair {
        /// Token pair, e.g. WAPS-SUSDC or <addressA>-<addressB>
        #[arg(long, value_name = "A-B")]
        pair: String,

        /// Swap fee in basis points (1 bp = 0.01%), 1–100
        #[arg(long, value_name = "BPS")]
        fee_bps: Option<u16>,
    },

    /// List every pool in creation order
    Pairs,

    /// Credit test tokens to an address (in-memory faucet)
    #[command(
        after_help = "\
EXAMPLES:
  simple-dex mint --token WAPS --amount 1000000
  simple-dex mint --token SUSDC --amount 500 --to 0x00000000000000000000000000000000000000b0"
    )]
    Mint {
        /// Token symbol or address
        #[arg(long, value_name = "TOKEN")]
        token: String,

        /// Amount in atomic units
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount: U256,

        /// Recipient; defaults to --account
        #[arg(long, value_name = "ADDRESS")]
        to: Option<String>,
    },

    /// Show token balances of an address
    Balance {
        /// Only this token; all holdings if omitted
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,

        /// Address to inspect; defaults to --account
        #[arg(long, value_name = "ADDRESS")]
        of: Option<String>,
    },

    /// Add liquidity to a pool and receive shares
    ///
    /// Shares track your proportional ownership of the pool. Trading fees
    /// accrue to your shares through a Q64.64 per-share accumulator and are
    /// collected with `claim-fees`.
    #[command(
        after_help = "\
EXAMPLES:
  # Seed an empty pool (first deposit sets the price)
  simple-dex provide --pair WAPS-SUSDC --amount 1000 --amount-b 2000

  # Add to an existing pool (amount-b computed from live reserves)
  simple-dex provide --pair WAPS-SUSDC --amount 500

NOTES:
  First deposit requires --amount-b and mints shares equal to the first
  token's amount. Later deposits mint min(a·L/r_a, b·L/r_b); a mismatched
  ratio is not refunded, so prefer omitting --amount-b."
    )]
    Provide {
        /// Token pair of the pool, e.g. WAPS-SUSDC
        #[arg(long, value_name = "A-B")]
        pair: String,

        /// Amount of token A to deposit (atomic units)
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount: U256,

        /// Amount of token B. Required for the first deposit, computed otherwise.
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount_b: Option<U256>,

        /// Reject if fewer shares would be minted
        #[arg(long, value_name = "SHARES", value_parser = parse_amount, default_value = "0")]
        min_shares: U256,
    },

    /// Burn shares and withdraw the proportional reserves
    #[command(
        after_help = "\
EXAMPLES:
  simple-dex remove-liquidity --pair WAPS-SUSDC --shares 500

  # With slippage guards
  simple-dex remove-liquidity --pair WAPS-SUSDC --shares 500 --min-a 490 --min-b 980

NOTES:
  Claim fees first: closing a position (burning all shares) forfeits any
  fees it has not claimed. Run `simple-dex my-fees` to check."
    )]
    RemoveLiquidity {
        /// Token pair of the pool, e.g. WAPS-SUSDC
        #[arg(long, value_name = "A-B")]
        pair: String,

        /// Number of shares to burn (run `my-positions` to see your balance)
        #[arg(long, value_name = "SHARES", value_parser = parse_amount)]
        shares: U256,

        /// Minimum token A to accept
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount, default_value = "0")]
        min_a: U256,

        /// Minimum token B to accept
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount, default_value = "0")]
        min_b: U256,
    },

    /// Preview a swap: fee, output and price impact. Nothing is executed.
    #[command(
        after_help = "\
EXAMPLES:
  simple-dex simulate --in WAPS --out SUSDC --amount 10

FEE MODEL:
  effective     = amount_in × (10000 − fee_bps) / 10000
  fee           = amount_in − effective       → stays in the pool (LPs)
  estimated_out = reserve_out × effective / (reserve_in + effective)"
    )]
    Simulate {
        /// Token to sell
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,

        /// Token to receive
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,

        /// Amount to sell (atomic units)
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount: U256,
    },

    /// Execute a swap through a constant-product pool
    ///
    /// A simulation runs first; the swap fails without side effects if the
    /// output would fall more than --max-slippage below it.
    #[command(
        after_help = "\
EXAMPLES:
  simple-dex convert --in WAPS --out SUSDC --amount 10
  simple-dex convert --in WAPS --out SUSDC --amount 10 --max-slippage 0.1
  simple-dex convert --in SUSDC --out WAPS --amount 100 --json"
    )]
    Convert {
        /// Token to sell
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,

        /// Token to receive
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,

        /// Amount to sell (atomic units)
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount: U256,

        /// Maximum tolerated slippage in percent; 0 disables the guard
        #[arg(long, value_name = "PCT", default_value_t = 0.5)]
        max_slippage: f64,
    },

    /// Show reserves, liquidity, fee rate and spot price of a pool
    PoolInfo {
        /// Token pair, e.g. WAPS-SUSDC
        #[arg(long, value_name = "A-B")]
        pair: String,
    },

    /// List the liquidity positions of --account
    MyPositions,

    /// Show claimable fees across every position of --account
    MyFees,

    /// Collect accrued fees from one pool position
    #[command(
        name = "claim-fees",
        after_help = "\
EXAMPLES:
  simple-dex claim-fees --pair WAPS-SUSDC

  # Check claimable amounts first:
  simple-dex my-fees --json

NOTES:
  Fees are paid out of the pool reserves. A reserve is never paid below
  one unit; whatever it cannot cover stays owed for a later claim. A claim
  with nothing payable succeeds and transfers nothing."
    )]
    ClaimFees {
        /// Token pair of the pool, e.g. WAPS-SUSDC
        #[arg(long, value_name = "A-B")]
        pair: String,
    },

    /// Print the event log
    Events {
        /// Only events of this pool
        #[arg(long, value_name = "A-B")]
        pair: Option<String>,

        /// Show only the most recent N events
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

impl Commands {
    /// Commands that change state and must be persisted.
    fn mutates(&self) -> bool {
        matches!(
            self,
            Commands::CreatePair { .. }
                | Commands::Mint { .. }
                | Commands::Provide { .. }
                | Commands::RemoveLiquidity { .. }
                | Commands::Convert { .. }
                | Commands::ClaimFees { .. }
        )
    }
}

/// Everything a command needs once options and config are merged.
struct App {
    client:          DexClient,
    tokens:          TokenRegistry,
    account:         Option<String>,
    default_fee_bps: u16,
    json:            bool,
}

impl App {
    fn account(&self) -> Result<Address> {
        let raw = self.account.as_deref().ok_or_else(|| anyhow!(
            "No account set.\n  \
             Set SIMPLE_DEX_ACCOUNT, pass --account <ADDRESS>, or add `account` to simple-dex.toml."
        ))?;
        Address::from_str(raw).map_err(|_| anyhow!("--account '{raw}' is not a 0x-prefixed 20-byte address."))
    }

    fn address_or_account(&self, explicit: Option<&str>) -> Result<Address> {
        match explicit {
            Some(raw) => Address::from_str(raw).map_err(|_| anyhow!("'{raw}' is not a 0x-prefixed 20-byte address.")),
            None => self.account(),
        }
    }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(config.log_level.as_deref())?;

    let state_path = cli
        .state
        .clone()
        .or_else(|| config.state_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
    let state = DexState::load(&state_path)
        .with_context(|| format!("Cannot load state from '{}'", state_path.display()))?;
    tracing::debug!(path = %state_path.display(), "state ready");

    let app = App {
        client:          DexClient::spawn(state),
        tokens:          config.token_registry(),
        account:         cli.account.clone().or_else(|| config.account.clone()),
        default_fee_bps: config.default_fee_bps.unwrap_or(FEE_RATE_DEFAULT_BPS),
        json:            cli.json,
    };

    match &cli.command {
        Commands::CreatePair { pair, fee_bps } => {
            cmd_create_pair(&app, pair, fee_bps.unwrap_or(app.default_fee_bps)).await?;
        }
        Commands::Pairs => cmd_pairs(&app).await?,
        Commands::Mint { token, amount, to } => {
            cmd_mint(&app, token, *amount, to.as_deref()).await?;
        }
        Commands::Balance { token, of } => {
            cmd_balance(&app, token.as_deref(), of.as_deref()).await?;
        }
        Commands::Provide { pair, amount, amount_b, min_shares } => {
            cmd_provide(&app, pair, *amount, *amount_b, *min_shares).await?;
        }
        Commands::RemoveLiquidity { pair, shares, min_a, min_b } => {
            cmd_remove_liquidity(&app, pair, *shares, *min_a, *min_b).await?;
        }
        Commands::Simulate { token_in, token_out, amount } => {
            cmd_simulate(&app, token_in, token_out, *amount).await?;
        }
        Commands::Convert { token_in, token_out, amount, max_slippage } => {
            cmd_convert(&app, token_in, token_out, *amount, *max_slippage).await?;
        }
        Commands::PoolInfo { pair } => cmd_pool_info(&app, pair).await?,
        Commands::MyPositions => cmd_my_positions(&app).await?,
        Commands::MyFees => cmd_my_fees(&app).await?,
        Commands::ClaimFees { pair } => cmd_claim_fees(&app, pair).await?,
        Commands::Events { pair, limit } => cmd_events(&app, pair.as_deref(), *limit).await?,
    }

    if cli.command.mutates() {
        app.client
            .snapshot()
            .await?
            .save(&state_path)
            .with_context(|| format!("Cannot save state to '{}'", state_path.display()))?;
    }
    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the config file's `log_level`.
fn init_tracing(config_level: Option<&str>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config_level.unwrap_or("warn"))
            .map_err(|e| anyhow!("Invalid log_level in config: {e}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

// ─── create-pair ──────────────────────────────────────────────────────────────

async fn cmd_create_pair(app: &App, pair: &str, fee_rate_bps: u16) -> Result<()> {
    let (sym_a, sym_b, token_a, token_b) = parse_pair(&app.tokens, pair)?;
    if !(FEE_RATE_MIN_BPS..=FEE_RATE_MAX_BPS).contains(&fee_rate_bps) {
        return Err(anyhow!(
            "--fee-bps {} is out of range. Allowed: {}–{} (0.01%–1.00%).",
            fee_rate_bps, FEE_RATE_MIN_BPS, FEE_RATE_MAX_BPS
        ));
    }

    let result = app
        .client
        .create_pair(CreatePairParams { token_a, token_b, fee_rate_bps })
        .await
        .with_context(|| format!("Cannot create pair '{pair}'"))?;

    if app.json {
        println!("{}", json!({
            "status":       "ok",
            "command":      "create-pair",
            "pair":         result.pair.to_string(),
            "token0":       { "symbol": sym_a, "address": token_a.to_string() },
            "token1":       { "symbol": sym_b, "address": token_b.to_string() },
            "fee_rate_bps": fee_rate_bps,
            "pair_count":   result.pair_count,
        }));
    } else {
        println!("─── Pair Created ─────────────────────────────────────────────────");
        println!("  Pair             {sym_a}/{sym_b}");
        println!("  Pool             {}", result.pair);
        println!("  Token 0          {sym_a}  ({token_a})");
        println!("  Token 1          {sym_b}  ({token_b})");
        println!("  Fee rate         {} bps  ({:.2}% per swap)", fee_rate_bps, fee_rate_bps as f64 / 100.0);
        println!("  Pairs total      {}", result.pair_count);
        println!();
        println!("  The pool is empty. Seed it with:");
        println!("    simple-dex provide --pair {sym_a}-{sym_b} --amount <A> --amount-b <B>");
    }
    Ok(())
}

// ─── pairs ────────────────────────────────────────────────────────────────────

async fn cmd_pairs(app: &App) -> Result<()> {
    let pairs = app.client.pairs().await?;

    if app.json {
        let items: Vec<_> = pairs.iter().enumerate().map(|(i, p)| json!({
            "index":           i,
            "pair":            p.pair.to_string(),
            "label":           app.tokens.pair_label(&p.token0, &p.token1),
            "token0":          p.token0.to_string(),
            "token1":          p.token1.to_string(),
            "reserve0":        p.reserve0.to_string(),
            "reserve1":        p.reserve1.to_string(),
            "total_liquidity": p.total_liquidity.to_string(),
            "fee_rate_bps":    p.fee_rate_bps,
        })).collect();
        println!("{}", json!({ "status": "ok", "command": "pairs", "count": pairs.len(), "pairs": items }));
    } else {
        println!("─── Pairs ────────────────────────────────────────────────────────");
        if pairs.is_empty() {
            println!("  No pairs yet. Run `simple-dex create-pair --pair <A>-<B>` to create one.");
            return Ok(());
        }
        for (i, p) in pairs.iter().enumerate() {
            println!("  [{i:>2}]  {}", app.tokens.pair_label(&p.token0, &p.token1));
            println!("        Pool       {}", p.pair);
            println!("        Reserves   {} / {}", p.reserve0, p.reserve1);
            println!("        Fee        {} bps", p.fee_rate_bps);
        }
        println!();
        println!("  Total: {} pair(s)", pairs.len());
    }
    Ok(())
}

// ─── mint / balance ───────────────────────────────────────────────────────────

async fn cmd_mint(app: &App, token: &str, amount: U256, to: Option<&str>) -> Result<()> {
    let token_addr = app.tokens.resolve(token).context("--token")?;
    let recipient = app.address_or_account(to)?;
    if amount.is_zero() {
        return Err(anyhow!("--amount must be > 0 (atomic units)."));
    }

    let balance = app.client.mint(token_addr, recipient, amount).await?;
    let symbol = app.tokens.symbol(&token_addr);

    if app.json {
        println!("{}", json!({
            "status":  "ok",
            "command": "mint",
            "token":   token_addr.to_string(),
            "symbol":  symbol,
            "to":      recipient.to_string(),
            "amount":  amount.to_string(),
            "balance": balance.to_string(),
        }));
    } else {
        println!("─── Minted ───────────────────────────────────────────────────────");
        println!("  Token            {symbol}  ({token_addr})");
        println!("  To               {recipient}");
        println!("  Amount           {:>20}", amount);
        println!("  New balance      {:>20}", balance);
    }
    Ok(())
}

async fn cmd_balance(app: &App, token: Option<&str>, of: Option<&str>) -> Result<()> {
    let owner = app.address_or_account(of)?;
    let holdings = match token {
        Some(t) => {
            let addr = app.tokens.resolve(t).context("--token")?;
            vec![(addr, app.client.balance_of(addr, owner).await?)]
        }
        None => app.client.balances(owner).await?,
    };

    if app.json {
        let items: Vec<_> = holdings.iter().map(|(t, b)| json!({
            "token":   t.to_string(),
            "symbol":  app.tokens.symbol(t),
            "balance": b.to_string(),
        })).collect();
        println!("{}", json!({ "status": "ok", "command": "balance", "owner": owner.to_string(), "balances": items }));
    } else {
        println!("─── Balances ─────────────────────────────────────────────────────");
        println!("  Owner   {owner}");
        println!();
        if holdings.is_empty() {
            println!("  No tokens held. Run `simple-dex mint --token <T> --amount <N>` for test funds.");
        }
        for (t, b) in &holdings {
            println!("  {:<14} {:>24}", app.tokens.symbol(t), b);
        }
    }
    Ok(())
}

// ─── provide ──────────────────────────────────────────────────────────────────

async fn cmd_provide(
    app: &App,
    pair: &str,
    amount_a: U256,
    amount_b: Option<U256>,
    min_shares: U256,
) -> Result<()> {
    let owner = app.account()?;
    let (sym_a, sym_b, token_a, token_b) = parse_pair(&app.tokens, pair)?;
    if amount_a.is_zero() {
        return Err(anyhow!("--amount must be > 0 (atomic units)."));
    }

    let result = app
        .client
        .provide_liquidity(ProvideParams { owner, token_a, token_b, amount_a, amount_b, min_shares })
        .await
        .map_err(|e| match e {
            simple_dex_sdk::Error::AmountBRequired => anyhow!(
                "Pool '{pair}' is empty: the first deposit sets the price.\n  \
                 Pass --amount-b <AMOUNT> as well."
            ),
            other => anyhow!(other).context(format!("Cannot provide liquidity to '{pair}'")),
        })?;

    if app.json {
        println!("{}", json!({
            "status":        "ok",
            "command":       "provide",
            "pair":          pair,
            "pool":          result.pair.to_string(),
            "provider":      owner.to_string(),
            "amount_a":      result.amount_a.to_string(),
            "amount_b":      result.amount_b.to_string(),
            "shares_minted": result.shares_minted.to_string(),
            "reserve0":      result.reserve0.to_string(),
            "reserve1":      result.reserve1.to_string(),
        }));
    } else {
        println!("─── Liquidity Provided ───────────────────────────────────────────");
        println!("  Pair             {pair}");
        println!("  Pool             {}", result.pair);
        println!("  Provider         {owner}");
        println!("  Deposited {sym_a:<6} {:>20}", result.amount_a);
        println!("  Deposited {sym_b:<6} {:>20}", result.amount_b);
        println!("  Shares minted    {:>20}", result.shares_minted);
        println!("  Reserves now     {} / {}", result.reserve0, result.reserve1);
    }
    Ok(())
}

// ─── remove-liquidity ─────────────────────────────────────────────────────────

async fn cmd_remove_liquidity(app: &App, pair: &str, shares: U256, min_a: U256, min_b: U256) -> Result<()> {
    let owner = app.account()?;
    let (sym_a, sym_b, token_a, token_b) = parse_pair(&app.tokens, pair)?;
    if shares.is_zero() {
        return Err(anyhow!("--shares must be > 0. Run `simple-dex my-positions` to see your balance."));
    }

    let result = app
        .client
        .remove_liquidity(RemoveParams {
            owner,
            token_a,
            token_b,
            shares,
            min_amount_a: min_a,
            min_amount_b: min_b,
        })
        .await
        .with_context(|| format!("Cannot remove liquidity from '{pair}'"))?;
    let forfeited = !result.forfeited_fee_a.is_zero() || !result.forfeited_fee_b.is_zero();

    if app.json {
        println!("{}", json!({
            "status":          "ok",
            "command":         "remove-liquidity",
            "pair":            pair,
            "pool":            result.pair.to_string(),
            "shares_burned":   shares.to_string(),
            "amount_a":        result.amount_a.to_string(),
            "amount_b":        result.amount_b.to_string(),
            "forfeited_fee_a": result.forfeited_fee_a.to_string(),
            "forfeited_fee_b": result.forfeited_fee_b.to_string(),
        }));
    } else {
        println!("─── Liquidity Removed ────────────────────────────────────────────");
        println!("  Pair             {pair}");
        println!("  Pool             {}", result.pair);
        println!("  Shares burned    {:>20}", shares);
        println!("  Received {sym_a:<7} {:>20}", result.amount_a);
        println!("  Received {sym_b:<7} {:>20}", result.amount_b);
        if forfeited {
            println!();
            println!("  Position closed with unclaimed fees; forfeited {} {sym_a} + {} {sym_b}.",
                     result.forfeited_fee_a, result.forfeited_fee_b);
        }
    }
    Ok(())
}

// ─── simulate ─────────────────────────────────────────────────────────────────

async fn cmd_simulate(app: &App, token_in: &str, token_out: &str, amount_in: U256) -> Result<()> {
    let (addr_in, addr_out) = resolve_swap_tokens(&app.tokens, token_in, token_out, amount_in)?;

    let sim = app
        .client
        .simulate(SimulateParams { token_in: addr_in, token_out: addr_out, amount_in })
        .await
        .map_err(|e| swap_error(e, token_in, token_out))?;

    if app.json {
        println!("{}", json!({
            "status":           "ok",
            "command":          "simulate",
            "token_in":         token_in,
            "token_out":        token_out,
            "pool":             sim.pair.to_string(),
            "amount_in":        sim.amount_in.to_string(),
            "fee":              sim.fee.to_string(),
            "effective_input":  sim.effective_input.to_string(),
            "estimated_out":    sim.estimated_out.to_string(),
            "effective_rate":   sim.effective_rate,
            "price_impact_pct": sim.price_impact_pct,
            "fee_rate_bps":     sim.fee_rate_bps,
            "reserve_in":       sim.reserve_in.to_string(),
            "reserve_out":      sim.reserve_out.to_string(),
        }));
    } else {
        println!("─── Swap Simulation ──────────────────────────────────────────────");
        println!("  {token_in} → {token_out}");
        println!("  Pool             {}", sim.pair);
        println!("  Reserve in       {:>20}", sim.reserve_in);
        println!("  Reserve out      {:>20}", sim.reserve_out);
        println!();
        println!("  ─── Fee Breakdown ────────────────────────────────");
        println!("  Amount in        {:>20}", sim.amount_in);
        println!("  Fee              {:>20}  ({:.2}%  →  pool/LPs)",
                 sim.fee, sim.fee_rate_bps as f64 / 100.0);
        println!("  Effective input  {:>20}", sim.effective_input);
        println!();
        println!("  ─── Output Estimate ──────────────────────────────");
        println!("  Estimated out    {:>20}", sim.estimated_out);
        println!("  Effective rate   {:>20.8}  {token_out}/{token_in} (raw units)", sim.effective_rate);
        println!("  Price impact     {:>19.4}%", sim.price_impact_pct);
        println!();
        println!("  Nothing executed.  To swap:");
        println!("    simple-dex convert --in {token_in} --out {token_out} --amount {amount_in}");
    }
    Ok(())
}

// ─── convert ──────────────────────────────────────────────────────────────────

async fn cmd_convert(app: &App, token_in: &str, token_out: &str, amount_in: U256, max_slippage_pct: f64) -> Result<()> {
    let owner = app.account()?;
    let (addr_in, addr_out) = resolve_swap_tokens(&app.tokens, token_in, token_out, amount_in)?;
    let max_slippage_bps = slippage_bps(max_slippage_pct)?;

    let result = app
        .client
        .convert(SwapParams { owner, token_in: addr_in, token_out: addr_out, amount_in, max_slippage_bps })
        .await
        .map_err(|e| swap_error(e, token_in, token_out))?;

    if app.json {
        println!("{}", json!({
            "status":           "ok",
            "command":          "convert",
            "token_in":         token_in,
            "token_out":        token_out,
            "pool":             result.pair.to_string(),
            "trader":           owner.to_string(),
            "amount_in":        result.amount_in.to_string(),
            "amount_out":       result.amount_out.to_string(),
            "estimated_out":    result.estimated_out.to_string(),
            "min_amount_out":   result.min_amount_out.to_string(),
            "fee":              result.fee.to_string(),
            "max_slippage_bps": max_slippage_bps,
        }));
    } else {
        println!("─── Swap Executed ────────────────────────────────────────────────");
        println!("  {token_in} → {token_out}");
        println!("  Pool             {}", result.pair);
        println!("  Sold             {:>20}  {token_in}", result.amount_in);
        println!("  Received         {:>20}  {token_out}", result.amount_out);
        println!("  Fee              {:>20}  {token_in}", result.fee);
        println!("  Min accepted     {:>20}  ({max_slippage_pct}% slippage)", result.min_amount_out);
    }
    Ok(())
}

// ─── pool-info ────────────────────────────────────────────────────────────────

async fn cmd_pool_info(app: &App, pair: &str) -> Result<()> {
    let (_, _, token_a, token_b) = parse_pair(&app.tokens, pair)?;
    let info = app.client.pool_info(token_a, token_b).await.map_err(|e| match e {
        simple_dex_sdk::Error::PoolNotFound(..) => anyhow!(
            "Pool not found for '{pair}'. Run `simple-dex create-pair --pair {pair}` first."
        ),
        other => anyhow!(other),
    })?;
    let sym0 = app.tokens.symbol(&info.token0);
    let sym1 = app.tokens.symbol(&info.token1);

    if app.json {
        println!("{}", json!({
            "status":  "ok",
            "command": "pool-info",
            "pair":    pair,
            "pool":    info.pair.to_string(),
            "token0": {
                "symbol": sym0, "address": info.token0.to_string(),
                "reserve": info.reserve0.to_string(), "accumulated_fee": info.accumulated_fee0.to_string(),
            },
            "token1": {
                "symbol": sym1, "address": info.token1.to_string(),
                "reserve": info.reserve1.to_string(), "accumulated_fee": info.accumulated_fee1.to_string(),
            },
            "total_liquidity": info.total_liquidity.to_string(),
            "fee_rate_bps":    info.fee_rate_bps,
            "fee_rate_pct":    info.fee_rate_bps as f64 / 100.0,
            "spot_price_1_per_0": info.spot_price,
        }));
    } else {
        println!("─── Pool Info: {pair} ──────────────────────────────────────────────");
        println!("  Pool             {}", info.pair);
        println!();
        println!("  Token 0          {sym0}  ({})", info.token0);
        println!("  Reserve 0        {:>20}", info.reserve0);
        println!("  Fees collected 0 {:>20}", info.accumulated_fee0);
        println!();
        println!("  Token 1          {sym1}  ({})", info.token1);
        println!("  Reserve 1        {:>20}", info.reserve1);
        println!("  Fees collected 1 {:>20}", info.accumulated_fee1);
        println!();
        println!("  Total liquidity  {:>20}", info.total_liquidity);
        println!("  Fee rate         {} bps  ({:.2}% per swap)",
                 info.fee_rate_bps, info.fee_rate_bps as f64 / 100.0);
        if info.reserve0.is_zero() {
            println!("  Spot price       — (pool is empty, no liquidity)");
        } else {
            println!("  Spot price       {:.8}  {sym1}/{sym0}  (raw atomic units)", info.spot_price);
        }
    }
    Ok(())
}

// ─── my-positions ─────────────────────────────────────────────────────────────

async fn cmd_my_positions(app: &App) -> Result<()> {
    let owner = app.account()?;
    let positions = app.client.my_positions(owner).await?;

    if app.json {
        let items: Vec<_> = positions.iter().map(|p| position_json(&app.tokens, p)).collect();
        println!("{}", json!({
            "status": "ok", "command": "my-positions",
            "owner": owner.to_string(), "positions": items,
        }));
        return Ok(());
    }

    println!("─── My Positions ─────────────────────────────────────────────────");
    println!("  Owner   {owner}");
    println!();
    if positions.is_empty() {
        println!("  No liquidity positions found.");
        println!("  Run `simple-dex provide --pair <PAIR> --amount <AMT>` to become an LP.");
        return Ok(());
    }
    for (i, p) in positions.iter().enumerate() {
        println!("  [{i:>2}]  Pair       {}", app.tokens.pair_label(&p.token0, &p.token1));
        println!("        Pool       {}", p.pair);
        println!("        Shares     {:>20}  ({:.4}% of pool)", p.shares, p.pool_share_pct);
        println!();
    }
    println!("  Total: {} position(s)  ·  run `my-fees` to see claimable balances", positions.len());
    Ok(())
}

// ─── my-fees ──────────────────────────────────────────────────────────────────

async fn cmd_my_fees(app: &App) -> Result<()> {
    let owner = app.account()?;
    let summary = app.client.my_fees(owner).await?;

    if app.json {
        let items: Vec<_> = summary.positions.iter().map(|p| position_json(&app.tokens, p)).collect();
        let totals: serde_json::Map<String, serde_json::Value> = summary
            .totals
            .iter()
            .map(|(t, v)| (app.tokens.symbol(t), json!(v.to_string())))
            .collect();
        println!("{}", json!({
            "status": "ok", "command": "my-fees",
            "owner": owner.to_string(), "positions": items, "totals": totals,
        }));
        return Ok(());
    }

    println!("─── My Fees ──────────────────────────────────────────────────────");
    println!("  Owner   {owner}");
    println!();
    if summary.positions.is_empty() {
        println!("  No liquidity positions found.");
        return Ok(());
    }
    for p in &summary.positions {
        let sym0 = app.tokens.symbol(&p.token0);
        let sym1 = app.tokens.symbol(&p.token1);
        println!("  {sym0}/{sym1}  ({})", p.pair);
        println!("    Owed      {:>20} {sym0}   {:>20} {sym1}", p.fees_owed0, p.fees_owed1);
        println!("    Pending   {:>20} {sym0}   {:>20} {sym1}", p.pending_fee0, p.pending_fee1);
        println!("    Claimable {:>20} {sym0}   {:>20} {sym1}", p.total_fee0, p.total_fee1);
        println!();
    }
    println!("  ─── Totals ───────────────────────────────────────");
    for (t, v) in &summary.totals {
        println!("  {:<14} {:>24}", app.tokens.symbol(t), v);
    }
    println!();
    println!("  Run `simple-dex claim-fees --pair <PAIR>` to collect.");
    Ok(())
}

// ─── claim-fees ───────────────────────────────────────────────────────────────

async fn cmd_claim_fees(app: &App, pair: &str) -> Result<()> {
    let owner = app.account()?;
    let (_, _, token_a, token_b) = parse_pair(&app.tokens, pair)?;

    let result = app
        .client
        .claim_fees(owner, token_a, token_b)
        .await
        .with_context(|| format!("Cannot claim fees from '{pair}'"))?;
    let sym0 = app.tokens.symbol(&result.token0);
    let sym1 = app.tokens.symbol(&result.token1);

    if app.json {
        println!("{}", json!({
            "status":  "ok",
            "command": "claim-fees",
            "pair":    pair,
            "pool":    result.pair.to_string(),
            "owner":   owner.to_string(),
            "fee0":    result.fee0.to_string(),
            "fee1":    result.fee1.to_string(),
        }));
    } else if result.fee0.is_zero() && result.fee1.is_zero() {
        println!("─── Claim Fees ───────────────────────────────────────────────────");
        println!("  Pair             {pair}");
        println!("  No fees to claim.");
    } else {
        println!("─── Fees Claimed ─────────────────────────────────────────────────");
        println!("  Pair             {pair}");
        println!("  Pool             {}", result.pair);
        println!("  Received {sym0:<7} {:>20}", result.fee0);
        println!("  Received {sym1:<7} {:>20}", result.fee1);
    }
    Ok(())
}

// ─── events ───────────────────────────────────────────────────────────────────

async fn cmd_events(app: &App, pair: Option<&str>, limit: Option<usize>) -> Result<()> {
    let pool = match pair {
        Some(p) => {
            let (_, _, token_a, token_b) = parse_pair(&app.tokens, p)?;
            Some(app.client.pool_info(token_a, token_b).await?.pair)
        }
        None => None,
    };
    let mut events = app.client.events(pool).await?;
    if let Some(n) = limit {
        let skip = events.len().saturating_sub(n);
        events.drain(..skip);
    }

    if app.json {
        println!("{}", json!({ "status": "ok", "command": "events", "count": events.len(), "events": events }));
        return Ok(());
    }

    println!("─── Events ───────────────────────────────────────────────────────");
    if events.is_empty() {
        println!("  No events recorded.");
    }
    for e in &events {
        println!("  {}", describe_event(&app.tokens, e));
    }
    Ok(())
}

// ─── Shared utilities ─────────────────────────────────────────────────────────

/// Parse `"TOKEN_A-TOKEN_B"` into `(sym_a, sym_b, token_a, token_b)`.
fn parse_pair<'a>(tokens: &TokenRegistry, pair: &'a str) -> Result<(&'a str, &'a str, Address, Address)> {
    let parts: Vec<&str> = pair.splitn(2, '-').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(anyhow!(
            "--pair must be TOKEN_A-TOKEN_B (e.g. WAPS-SUSDC or <addressA>-<addressB>). Got: '{}'",
            pair
        ));
    }
    let (sym_a, sym_b) = (parts[0], parts[1]);
    let token_a = tokens.resolve(sym_a).context("pair: token A")?;
    let token_b = tokens.resolve(sym_b).context("pair: token B")?;
    if token_a == token_b {
        return Err(anyhow!("Token A and token B in --pair must be different."));
    }
    Ok((sym_a, sym_b, token_a, token_b))
}

fn resolve_swap_tokens(tokens: &TokenRegistry, token_in: &str, token_out: &str, amount_in: U256) -> Result<(Address, Address)> {
    let addr_in = tokens.resolve(token_in).context("--in")?;
    let addr_out = tokens.resolve(token_out).context("--out")?;
    if addr_in == addr_out {
        return Err(anyhow!("--in and --out must be different tokens."));
    }
    if amount_in.is_zero() {
        return Err(anyhow!("--amount must be > 0 (atomic units)."));
    }
    Ok((addr_in, addr_out))
}

/// Friendlier messages for the swap errors users hit most.
fn swap_error(err: simple_dex_sdk::Error, token_in: &str, token_out: &str) -> anyhow::Error {
    match err {
        simple_dex_sdk::Error::PoolNotFound(..) => anyhow!(
            "No pool found for {token_in}/{token_out}.\n  \
             Run `simple-dex create-pair --pair {token_in}-{token_out}` to create one."
        ),
        simple_dex_sdk::Error::NoLiquidity => anyhow!(
            "Pool has no liquidity yet.\n  \
             Run `simple-dex provide --pair {token_in}-{token_out}` to seed it first."
        ),
        other => anyhow!(other),
    }
}

/// Percent → basis points, e.g. `0.5` → `50`.
fn slippage_bps(pct: f64) -> Result<u16> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(anyhow!("--max-slippage must be between 0 and 100 (percent). Got: {pct}"));
    }
    Ok((pct * 100.0).round() as u16)
}

fn parse_amount(s: &str) -> std::result::Result<U256, String> {
    U256::from_str(s.trim()).map_err(|e| format!("'{s}' is not a non-negative integer amount: {e}"))
}

fn position_json(tokens: &TokenRegistry, p: &PositionInfo) -> serde_json::Value {
    json!({
        "pair":           p.pair.to_string(),
        "label":          tokens.pair_label(&p.token0, &p.token1),
        "shares":         p.shares.to_string(),
        "pool_share_pct": p.pool_share_pct,
        "fees_owed0":     p.fees_owed0.to_string(),
        "fees_owed1":     p.fees_owed1.to_string(),
        "pending_fee0":   p.pending_fee0.to_string(),
        "pending_fee1":   p.pending_fee1.to_string(),
        "total_fee0":     p.total_fee0.to_string(),
        "total_fee1":     p.total_fee1.to_string(),
    })
}

fn describe_event(tokens: &TokenRegistry, event: &DexEvent) -> String {
    match event {
        DexEvent::PairCreated { token0, token1, pair, pair_count } => {
            format!("PairCreated      #{pair_count} {}  {pair}", tokens.pair_label(token0, token1))
        }
        DexEvent::LiquidityAdded { provider, amount0, amount1, shares_minted, .. } => {
            format!("LiquidityAdded   {provider}  +{amount0} / +{amount1}  shares +{shares_minted}")
        }
        DexEvent::LiquidityRemoved { provider, shares, amount0, amount1, .. } => {
            format!("LiquidityRemoved {provider}  -{amount0} / -{amount1}  shares -{shares}")
        }
        DexEvent::Swapped { trader, token_in, amount_in, amount_out, .. } => {
            format!("Swapped          {trader}  {amount_in} {} → {amount_out}", tokens.symbol(token_in))
        }
        DexEvent::FeesClaimed { provider, fee0, fee1, .. } => {
            format!("FeesClaimed      {provider}  {fee0} / {fee1}")
        }
    }
}
