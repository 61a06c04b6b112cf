//! Runtime configuration. Built once at the process boundary from the
//! environment; the core modules only ever see the resulting struct and
//! never read ambient state themselves.

use crate::domain::types::parse_address;
use crate::errors::ProposeError;
use alloy_primitives::Address;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_NETWORK: &str = "NETWORK";
pub const ENV_PROVIDER_URL: &str = "PROVIDER_URL";
pub const ENV_FALLBACK_PROVIDER_URL: &str = "FALLBACK_PROVIDER_URL";
pub const ENV_DEPLOYER_ADDRESS: &str = "DEPLOYER_ADDRESS";
pub const ENV_PREMIUM_GAS: &str = "PREMIUM_GAS";
pub const ENV_DEPLOYMENTS_FILE: &str = "DEPLOYMENTS_FILE";
pub const ENV_CONFIRMATION_TIMEOUT_SECS: &str = "CONFIRMATION_TIMEOUT_SECS";

const DEFAULT_NETWORK: &str = "localhost";
const DEFAULT_PROVIDER_URL: &str = "http://localhost:8545";
const DEFAULT_DEPLOYMENTS_FILE: &str = "deployments.json";
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 600;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Where a submission is headed. Production-like networks wait for three
/// confirmations before the submission counts as durable; local and dev
/// networks wait for none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Rinkeby,
    Dev(String),
}

impl Network {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Network::Mainnet,
            "rinkeby" => Network::Rinkeby,
            other => Network::Dev(other.to_string()),
        }
    }

    pub fn required_confirmations(&self) -> u64 {
        match self {
            Network::Mainnet | Network::Rinkeby => 3,
            Network::Dev(_) => 0,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Rinkeby => f.write_str("rinkeby"),
            Network::Dev(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub network: Network,
    pub provider_url: String,
    pub fallback_provider_url: Option<String>,
    /// Account the node signs and submits from; signing infrastructure is
    /// the node/wallet collaborator's concern.
    pub deployer_address: Address,
    /// Percentage markup over the node's current gas price.
    pub gas_premium_pct: u64,
    pub deployments_file: PathBuf,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ProposeError> {
        let network = Network::from_name(
            &env_or(ENV_NETWORK, DEFAULT_NETWORK),
        );
        let provider_url = env_or(ENV_PROVIDER_URL, DEFAULT_PROVIDER_URL);
        let fallback_provider_url = non_empty(std::env::var(ENV_FALLBACK_PROVIDER_URL).ok());
        let deployer_raw = std::env::var(ENV_DEPLOYER_ADDRESS).map_err(|_| {
            ProposeError::Config(format!("{ENV_DEPLOYER_ADDRESS} must be set"))
        })?;
        let deployer_address = parse_address(&deployer_raw)?;
        let gas_premium_pct = parse_env_u64(ENV_PREMIUM_GAS, 0)?;
        let deployments_file = PathBuf::from(env_or(ENV_DEPLOYMENTS_FILE, DEFAULT_DEPLOYMENTS_FILE));
        let confirmation_timeout = Duration::from_secs(parse_env_u64(
            ENV_CONFIRMATION_TIMEOUT_SECS,
            DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        )?);

        Ok(Self {
            network,
            provider_url,
            fallback_provider_url,
            deployer_address,
            gas_premium_pct,
            deployments_file,
            confirmation_timeout,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    non_empty(std::env::var(name).ok()).unwrap_or_else(|| default.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ProposeError> {
    match non_empty(std::env::var(name).ok()) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|error| ProposeError::Config(format!("{name}={raw:?} is not a number: {error}"))),
    }
}
