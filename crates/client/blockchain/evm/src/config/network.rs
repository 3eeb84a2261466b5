//! EVM network configuration.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, U256, utils::parse_ether};
use client_blockchain_core::{BlockchainConfig, SubmitterConfig};
use url::Url;

/// Default native stake per game, in ether.
pub const DEFAULT_BET_AMOUNT: &str = "0.01";

/// Default location of the compiled contract ABI.
pub const DEFAULT_ABI_PATH: &str = "./contracts/RockPaperScissors_sol_RockPaperScissors.abi";

/// Default location of the compiled contract bytecode.
pub const DEFAULT_BIN_PATH: &str = "./contracts/RockPaperScissors_sol_RockPaperScissors.bin";

/// Configuration errors.
///
/// Raised before any network I/O; a command never starts with an incomplete
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0} is not set")]
    ConfigurationMissing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// EVM client configuration.
#[derive(Clone)]
pub struct EvmConfig {
    /// Network label used in logs
    pub network: String,

    /// JSON-RPC endpoint
    pub rpc_url: Option<String>,

    /// Primary signer (player one and contract owner)
    pub private_key: Option<String>,

    /// Second signer for multiplayer sessions
    pub player2_private_key: Option<String>,

    /// Deployed RockPaperScissors contract
    pub contract_address: Option<Address>,

    /// ERC-20 token used for token games
    pub token_address: Option<Address>,

    /// Native stake per game, in wei
    pub bet_amount: U256,

    /// House edge in basis points (constructor argument)
    pub house_edge_bps: Option<U256>,

    /// Randomness oracle subscription (constructor argument)
    pub vrf_subscription_id: Option<U256>,

    /// Compiled ABI artifact
    pub abi_path: PathBuf,

    /// Compiled bytecode artifact
    pub bin_path: PathBuf,

    /// Confirmations required per transaction
    pub confirmations: u64,

    /// Deadline for a transaction to confirm
    pub tx_timeout: Duration,

    /// Deadline for an oracle-delivered result event
    pub result_timeout: Duration,

    /// Receipt and log polling interval
    pub poll_interval: Duration,
}

impl EvmConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `NETWORK` - Network label (default: testnet)
    /// - `RPC_URL` - JSON-RPC endpoint
    /// - `PRIVATE_KEY` / `PLAYER2_PRIVATE_KEY` - Signer keys (hex)
    /// - `CONTRACT_ADDRESS` / `TOKEN_ADDRESS` - Deployed contracts
    /// - `BET_AMOUNT` - Native stake in ether (default: 0.01)
    /// - `HOUSE_EDGE_BPS` / `VRF_SUBSCRIPTION_ID` - Constructor arguments
    /// - `RPS_ABI_PATH` / `RPS_BIN_PATH` - Compiled artifacts
    /// - `CONFIRMATIONS` (default: 1), `TX_TIMEOUT_SECS` (default: 120),
    ///   `RESULT_TIMEOUT_SECS` (default: 300), `POLL_INTERVAL_MS` (default: 2000)
    ///
    /// Only malformed values fail here. Presence is checked per command with
    /// the `require_*` accessors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bet_amount = {
            let raw = get("BET_AMOUNT").unwrap_or_else(|| DEFAULT_BET_AMOUNT.to_string());
            parse_ether(&raw).map_err(|e| ConfigError::Invalid {
                var: "BET_AMOUNT",
                reason: e.to_string(),
            })?
        };

        let confirmations = parse_var(&get, "CONFIRMATIONS")?.unwrap_or(1u64);
        if confirmations == 0 {
            return Err(ConfigError::Invalid {
                var: "CONFIRMATIONS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            network: get("NETWORK").unwrap_or_else(|| "testnet".to_string()),
            rpc_url: get("RPC_URL"),
            private_key: get("PRIVATE_KEY"),
            player2_private_key: get("PLAYER2_PRIVATE_KEY"),
            contract_address: parse_var(&get, "CONTRACT_ADDRESS")?,
            token_address: parse_var(&get, "TOKEN_ADDRESS")?,
            bet_amount,
            house_edge_bps: parse_var(&get, "HOUSE_EDGE_BPS")?,
            vrf_subscription_id: parse_var(&get, "VRF_SUBSCRIPTION_ID")?,
            abi_path: get("RPS_ABI_PATH")
                .unwrap_or_else(|| DEFAULT_ABI_PATH.to_string())
                .into(),
            bin_path: get("RPS_BIN_PATH")
                .unwrap_or_else(|| DEFAULT_BIN_PATH.to_string())
                .into(),
            confirmations,
            tx_timeout: Duration::from_secs(parse_var(&get, "TX_TIMEOUT_SECS")?.unwrap_or(120)),
            result_timeout: Duration::from_secs(
                parse_var(&get, "RESULT_TIMEOUT_SECS")?.unwrap_or(300),
            ),
            poll_interval: Duration::from_millis(
                parse_var(&get, "POLL_INTERVAL_MS")?.unwrap_or(2000),
            ),
        })
    }

    pub fn require_rpc_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .rpc_url
            .as_deref()
            .ok_or(ConfigError::ConfigurationMissing("RPC_URL"))?;
        Url::parse(raw).map_err(|e| ConfigError::Invalid {
            var: "RPC_URL",
            reason: e.to_string(),
        })
    }

    pub fn require_private_key(&self) -> Result<&str, ConfigError> {
        self.private_key
            .as_deref()
            .ok_or(ConfigError::ConfigurationMissing("PRIVATE_KEY"))
    }

    pub fn require_player2_private_key(&self) -> Result<&str, ConfigError> {
        self.player2_private_key
            .as_deref()
            .ok_or(ConfigError::ConfigurationMissing("PLAYER2_PRIVATE_KEY"))
    }

    pub fn require_contract_address(&self) -> Result<Address, ConfigError> {
        self.contract_address
            .ok_or(ConfigError::ConfigurationMissing("CONTRACT_ADDRESS"))
    }

    pub fn require_token_address(&self) -> Result<Address, ConfigError> {
        self.token_address
            .ok_or(ConfigError::ConfigurationMissing("TOKEN_ADDRESS"))
    }

    pub fn require_house_edge_bps(&self) -> Result<U256, ConfigError> {
        let bps = self
            .house_edge_bps
            .ok_or(ConfigError::ConfigurationMissing("HOUSE_EDGE_BPS"))?;
        if bps > U256::from(10_000) {
            return Err(ConfigError::Invalid {
                var: "HOUSE_EDGE_BPS",
                reason: format!("{bps} exceeds 10000 basis points"),
            });
        }
        Ok(bps)
    }

    pub fn require_vrf_subscription_id(&self) -> Result<U256, ConfigError> {
        self.vrf_subscription_id
            .ok_or(ConfigError::ConfigurationMissing("VRF_SUBSCRIPTION_ID"))
    }

    /// Submitter settings derived from this configuration.
    pub fn submitter_config(&self) -> SubmitterConfig {
        SubmitterConfig::default()
            .with_confirmations(self.confirmations)
            .with_timeout(self.tx_timeout)
            .with_poll_interval(self.poll_interval)
    }
}

fn parse_var<T, G>(get: &G, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}

// Keys never reach logs.
impl fmt::Debug for EvmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("EvmConfig")
            .field("network", &self.network)
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &redact(&self.private_key))
            .field("player2_private_key", &redact(&self.player2_private_key))
            .field("contract_address", &self.contract_address)
            .field("token_address", &self.token_address)
            .field("bet_amount", &self.bet_amount)
            .field("house_edge_bps", &self.house_edge_bps)
            .field("vrf_subscription_id", &self.vrf_subscription_id)
            .field("abi_path", &self.abi_path)
            .field("bin_path", &self.bin_path)
            .field("confirmations", &self.confirmations)
            .field("tx_timeout", &self.tx_timeout)
            .field("result_timeout", &self.result_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl BlockchainConfig for EvmConfig {
    fn network_name(&self) -> &str {
        &self.network
    }

    fn rpc_url(&self) -> &str {
        self.rpc_url.as_deref().unwrap_or_default()
    }

    fn validate(&self) -> Result<(), String> {
        // RPC URL is optional here; commands that need it call `require_rpc_url`
        if let Some(url) = &self.rpc_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            return Err(format!("Invalid RPC URL format: {}", url));
        }

        if self.poll_interval.is_zero() {
            return Err("Poll interval must be greater than 0".to_string());
        }

        if self.tx_timeout < self.poll_interval {
            return Err("Transaction timeout is shorter than the poll interval".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<EvmConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EvmConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();

        assert_eq!(config.bet_amount, U256::from(10_000_000_000_000_000u64));
        assert_eq!(config.confirmations, 1);
        assert_eq!(config.tx_timeout, Duration::from_secs(120));
        assert_eq!(config.result_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.abi_path, PathBuf::from(DEFAULT_ABI_PATH));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_values_surface_per_requirement() {
        let config = config(&[("RPC_URL", "http://127.0.0.1:8545")]).unwrap();

        assert!(config.require_rpc_url().is_ok());
        assert_eq!(
            config.require_private_key(),
            Err(ConfigError::ConfigurationMissing("PRIVATE_KEY"))
        );
        assert_eq!(
            config.require_contract_address(),
            Err(ConfigError::ConfigurationMissing("CONTRACT_ADDRESS"))
        );
        assert_eq!(
            config.require_token_address(),
            Err(ConfigError::ConfigurationMissing("TOKEN_ADDRESS"))
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = config(&[("PRIVATE_KEY", "   ")]).unwrap();
        assert!(matches!(
            config.require_private_key(),
            Err(ConfigError::ConfigurationMissing("PRIVATE_KEY"))
        ));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            config(&[("CONTRACT_ADDRESS", "0x1234")]),
            Err(ConfigError::Invalid { var: "CONTRACT_ADDRESS", .. })
        ));
        assert!(matches!(
            config(&[("BET_AMOUNT", "lots")]),
            Err(ConfigError::Invalid { var: "BET_AMOUNT", .. })
        ));
        assert!(matches!(
            config(&[("CONFIRMATIONS", "0")]),
            Err(ConfigError::Invalid { var: "CONFIRMATIONS", .. })
        ));
        assert!(matches!(
            config(&[("HOUSE_EDGE_BPS", "20000")]).unwrap().require_house_edge_bps(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn submitter_config_follows_settings() {
        let config = config(&[("CONFIRMATIONS", "3"), ("TX_TIMEOUT_SECS", "30")]).unwrap();
        let submitter = config.submitter_config();

        assert_eq!(submitter.confirmations, 3);
        assert_eq!(submitter.timeout, Duration::from_secs(30));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let config = config(&[("PRIVATE_KEY", "0xabc123")]).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("abc123"));
        assert!(debug.contains("<redacted>"));
    }
}
