//! Gate server configuration.
//!
//! Loads configuration from a TOML file with support for environment
//! variable expansion in string values. Variables use `$VAR` or `${VAR}`
//! syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 4030
//! public_url = "https://punks.example"
//!
//! [chain]
//! rpc_url = "https://mainnet.base.org"
//! signer_private_key = "$OWNER_PRIVATE_KEY"
//! nft_contract = "$NFT_CONTRACT"
//! asset_contract = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
//! treasury = "$TREASURY_ADDRESS"
//!
//! [price]
//! amount = "12.00"
//! asset = "USDC"
//! network = "base"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to configuration file (default: `config.toml`)
//! - `HOST` / `PORT` — Override server bind address and port
//! - Secrets referenced by `$VAR` in the config file

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mintgate::challenge::{ChallengeConfig, ChallengeVariant, parse_pay_to};
use mintgate::error::ConfigurationError;
use mintgate::units::to_base_units;

/// Top-level gate server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `4030`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL used for the challenge's resource field and the
    /// payment-id resource. Falls back to request headers when unset.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Chain endpoint, signer, and contract addresses.
    pub chain: ChainConfig,

    /// Static pricing for the payment challenge.
    #[serde(default)]
    pub price: PriceConfig,
}

/// Chain-facing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// HTTP RPC endpoint URL.
    pub rpc_url: String,

    /// Private key of the collection owner (hex, with or without `0x`).
    /// Supports `$VAR` / `${VAR}` environment expansion.
    pub signer_private_key: String,

    /// Address of the NFT contract exposing `mintAfterPayment`.
    pub nft_contract: String,

    /// Address of the payment asset (USDC) contract whose transfer logs
    /// count as payment evidence.
    pub asset_contract: String,

    /// Treasury address that must receive the payment.
    pub treasury: String,

    /// Deadline for receipt lookups, in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,

    /// Deadline for the mint send and its confirmation wait, in seconds.
    #[serde(default = "default_mint_timeout_secs")]
    pub mint_timeout_secs: u64,
}

/// Static pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    /// Price as a decimal string, e.g. `"12.00"`.
    #[serde(default = "default_amount")]
    pub amount: String,

    /// Asset symbol, e.g. `"USDC"`.
    #[serde(default = "default_asset")]
    pub asset: String,

    /// Decimal exponent of the asset (6 for USDC).
    #[serde(default = "default_asset_decimals")]
    pub asset_decimals: u32,

    /// Chain identifier emitted in the challenge.
    #[serde(default = "default_network")]
    pub network: String,

    /// Payment validity window in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Challenge description; derived from amount and asset when unset.
    #[serde(default)]
    pub description: Option<String>,

    /// Challenge body shape to emit.
    #[serde(default)]
    pub variant: ChallengeVariant,

    /// Extra metadata for the extended challenge shape.
    #[serde(default)]
    pub extra: Option<Value>,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            amount: default_amount(),
            asset: default_asset(),
            asset_decimals: default_asset_decimals(),
            network: default_network(),
            timeout_seconds: default_timeout_seconds(),
            description: None,
            variant: ChallengeVariant::default(),
            extra: None,
        }
    }
}

/// Chain configuration after address and amount validation.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedChain {
    /// Parsed NFT contract address.
    pub nft_contract: Address,
    /// Parsed payment asset contract address.
    pub asset_contract: Address,
    /// Parsed treasury address.
    pub treasury: Address,
    /// Minimum qualifying payment, in the asset's base units.
    pub min_amount: U256,
    /// Receipt-lookup deadline.
    pub rpc_timeout: Duration,
    /// Mint settlement deadline.
    pub mint_timeout: Duration,
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    4030
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

fn default_mint_timeout_secs() -> u64 {
    90
}

fn default_amount() -> String {
    "12.00".to_owned()
}

fn default_asset() -> String {
    "USDC".to_owned()
}

fn default_asset_decimals() -> u32 {
    6
}

fn default_network() -> String {
    "base".to_owned()
}

fn default_timeout_seconds() -> u64 {
    300
}

impl ServerConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `config.toml` in the current directory.
    ///
    /// After loading, all string values with `$VAR` / `${VAR}` references
    /// are expanded from the process environment. `HOST` and `PORT` env
    /// vars override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            return Err(format!("configuration file not found: {path}").into());
        };

        // Expand environment variables in the raw TOML string
        let expanded = expand_env_vars(&content);

        let mut config: Self = toml::from_str(&expanded)?;

        // Allow HOST / PORT env overrides
        if let Ok(host) = std::env::var("HOST") {
            if let Ok(addr) = host.parse() {
                config.host = addr;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        Ok(config)
    }

    /// Validates the configured addresses and price.
    ///
    /// Run at startup so a misconfigured treasury or contract is fatal
    /// before the first request, never silently defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for an absent or ill-formed address
    /// or a price that does not convert to base units.
    pub fn resolve_chain(&self) -> Result<ResolvedChain, ConfigurationError> {
        let treasury = parse_pay_to(&self.chain.treasury)?;
        let nft_contract = parse_address("nft_contract", &self.chain.nft_contract)?;
        let asset_contract = parse_address("asset_contract", &self.chain.asset_contract)?;
        let min_amount = to_base_units(&self.price.amount, self.price.asset_decimals)?;

        Ok(ResolvedChain {
            nft_contract,
            asset_contract,
            treasury,
            min_amount,
            rpc_timeout: Duration::from_secs(self.chain.rpc_timeout_secs),
            mint_timeout: Duration::from_secs(self.chain.mint_timeout_secs),
        })
    }

    /// The challenge configuration derived from this file.
    #[must_use]
    pub fn challenge_config(&self) -> ChallengeConfig {
        ChallengeConfig {
            amount: self.price.amount.clone(),
            asset: self.price.asset.clone(),
            network: self.price.network.clone(),
            pay_to: self.chain.treasury.clone(),
            timeout_seconds: self.price.timeout_seconds,
            description: self.price.description.clone(),
            variant: self.price.variant,
            extra: self.price.extra.clone(),
        }
    }
}

fn parse_address(field: &'static str, raw: &str) -> Result<Address, ConfigurationError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidAddress {
            field,
            value: raw.to_owned(),
        })
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            let braced = chars.peek() == Some(&'{');
            if braced {
                chars.next(); // consume '{'
            }

            let mut var_name = String::new();
            while let Some(&c) = chars.peek() {
                if braced {
                    if c == '}' {
                        chars.next();
                        break;
                    }
                } else if !c.is_ascii_alphanumeric() && c != '_' {
                    break;
                }
                var_name.push(c);
                chars.next();
            }

            if var_name.is_empty() {
                result.push('$');
                if braced {
                    result.push('{');
                }
            } else if let Ok(val) = std::env::var(&var_name) {
                result.push_str(&val);
            } else {
                // Leave unresolved variable as-is
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced {
                    result.push('}');
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_MINIMAL: &str = r#"
[chain]
rpc_url = "https://mainnet.base.org"
signer_private_key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
nft_contract = "0x3333333333333333333333333333333333333333"
asset_contract = "0x2222222222222222222222222222222222222222"
treasury = "0x1111111111111111111111111111111111111111"
"#;

    #[test]
    fn minimal_file_uses_defaults() {
        let config: ServerConfig = toml::from_str(TOML_MINIMAL).unwrap();
        assert_eq!(config.port, 4030);
        assert_eq!(config.price.amount, "12.00");
        assert_eq!(config.price.asset, "USDC");
        assert_eq!(config.price.network, "base");
        assert_eq!(config.price.asset_decimals, 6);
        assert_eq!(config.price.variant, ChallengeVariant::Minimal);
        assert!(config.public_url.is_none());
    }

    #[test]
    fn resolve_chain_parses_addresses_and_price() {
        let config: ServerConfig = toml::from_str(TOML_MINIMAL).unwrap();
        let resolved = config.resolve_chain().unwrap();
        assert_eq!(resolved.min_amount, U256::from(12_000_000u64));
        assert_eq!(
            resolved.treasury,
            "0x1111111111111111111111111111111111111111"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(resolved.rpc_timeout, Duration::from_secs(30));
    }

    #[test]
    fn empty_treasury_is_fatal() {
        let toml = TOML_MINIMAL.replace("0x1111111111111111111111111111111111111111", "");
        let config: ServerConfig = toml::from_str(&toml).unwrap();
        assert!(matches!(
            config.resolve_chain(),
            Err(ConfigurationError::MissingPayTo)
        ));
    }

    #[test]
    fn malformed_contract_address_is_fatal() {
        let toml = TOML_MINIMAL.replace(
            "0x3333333333333333333333333333333333333333",
            "not-an-address",
        );
        let config: ServerConfig = toml::from_str(&toml).unwrap();
        assert!(matches!(
            config.resolve_chain(),
            Err(ConfigurationError::InvalidAddress {
                field: "nft_contract",
                ..
            })
        ));
    }

    #[test]
    fn over_precise_price_is_fatal() {
        let mut config: ServerConfig = toml::from_str(TOML_MINIMAL).unwrap();
        config.price.amount = "12.0000001".to_owned();
        assert!(matches!(
            config.resolve_chain(),
            Err(ConfigurationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn extended_variant_parses_from_toml() {
        let toml = format!(
            "{TOML_MINIMAL}\n[price]\nvariant = \"extended\"\nextra = {{ name = \"USD Coin\", version = \"2\" }}\n"
        );
        let config: ServerConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config.price.variant, ChallengeVariant::Extended);
        assert_eq!(config.price.extra.unwrap()["name"], "USD Coin");
    }

    #[test]
    fn unresolved_variables_are_left_as_is() {
        let input = "key = \"$DEFINITELY_NOT_SET_MINTGATE\"";
        assert_eq!(expand_env_vars(input), input);
        let braced = "key = \"${DEFINITELY_NOT_SET_MINTGATE}\"";
        assert_eq!(expand_env_vars(braced), braced);
    }

    #[test]
    fn lone_dollar_passes_through() {
        assert_eq!(expand_env_vars("cost: 12$"), "cost: 12$");
        assert_eq!(expand_env_vars("${"), "${");
    }
}
