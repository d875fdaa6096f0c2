use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "simple-dex.toml";
pub const DEFAULT_STATE_PATH: &str = "simple-dex-state.json";

// ─── Token symbol registry ────────────────────────────────────────────────────

const KNOWN_TOKENS: &[(&str, &str)] = &[
    ("WAPS",  "0xADb64775Fc297B7D3762c6CB7fA0D41099Cd2d73"),
    ("SUSDC", "0x17f5c0cEc8c989566ED3b0f6177CcC69c4429C54"),
];

/// Optional `simple-dex.toml`. Every field may be omitted.
///
/// ```toml
/// state_path      = "dex.json"
/// account         = "0x00000000000000000000000000000000000000a1"
/// log_level       = "info"
/// default_fee_bps = 30
///
/// [tokens]
/// WETH = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub state_path:      Option<PathBuf>,
    pub account:         Option<String>,
    pub log_level:       Option<String>,
    pub default_fee_bps: Option<u16>,
    /// Symbol → address, merged over the built-in registry
    pub tokens:          BTreeMap<String, Address>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config '{}'", path.as_ref().display()))?;
        toml::from_str(&s).with_context(|| format!("parse config '{}'", path.as_ref().display()))
    }

    /// `explicit` must exist; otherwise the default path is used if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn token_registry(&self) -> TokenRegistry {
        let mut symbols: BTreeMap<String, Address> = KNOWN_TOKENS
            .iter()
            .filter_map(|(sym, addr)| Address::from_str(addr).ok().map(|a| (sym.to_string(), a)))
            .collect();
        for (sym, addr) in &self.tokens {
            symbols.insert(sym.to_uppercase(), *addr);
        }
        TokenRegistry { symbols }
    }
}

#[derive(Debug, Clone)]
pub struct TokenRegistry {
    symbols: BTreeMap<String, Address>,
}

impl TokenRegistry {
    /// Resolve a symbol (case-insensitive) or a `0x` address.
    pub fn resolve(&self, symbol_or_address: &str) -> Result<Address> {
        if let Some(addr) = self.symbols.get(&symbol_or_address.to_uppercase()) {
            return Ok(*addr);
        }
        Address::from_str(symbol_or_address).map_err(|_| {
            anyhow!(
                "Unknown token '{}'. Use a known symbol ({}) or a 0x-prefixed address.",
                symbol_or_address,
                self.symbols.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }

    /// Reverse lookup: address → symbol, or shortened address for unknowns.
    pub fn symbol(&self, token: &Address) -> String {
        if let Some((sym, _)) = self.symbols.iter().find(|(_, a)| *a == token) {
            return sym.clone();
        }
        let addr = token.to_string();
        format!("{}…{}", &addr[..6], &addr[addr.len() - 4..])
    }

    /// `"SYM_A/SYM_B"` label for a pool.
    pub fn pair_label(&self, token0: &Address, token1: &Address) -> String {
        format!("{}/{}", self.symbol(token0), self.symbol(token1))
    }
}
