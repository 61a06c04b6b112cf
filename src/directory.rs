//! Contract address resolution. The composer never looks addresses up
//! globally; it is handed a [`ContractDirectory`] capability, so tests can
//! substitute an in-memory table and real runs read a deployments file.

use crate::domain::types::{parse_address, ContractHandle};
use crate::errors::ProposeError;
use alloy_primitives::Address;
use std::collections::BTreeMap;
use std::path::Path;

pub trait ContractDirectory {
    /// Look a contract up by its deployment name. Always returns a handle;
    /// the address is `None` when the name has no known deployment, and the
    /// encoder rejects such handles.
    fn lookup(&self, name: &str) -> ContractHandle;

    /// A callable facet living at another contract's address, e.g. the vault
    /// admin interface behind the vault proxy.
    fn facet(&self, facet_name: &str, proxy: &ContractHandle) -> ContractHandle {
        ContractHandle {
            name: facet_name.to_string(),
            address: proxy.address,
        }
    }
}

/// Directory backed by a flat `{ "Name": "0x…" }` JSON deployments file,
/// re-read on every run so a redeploy between runs is never masked by a
/// stale cache.
#[derive(Debug)]
pub struct StaticDirectory {
    entries: BTreeMap<String, Address>,
}

impl StaticDirectory {
    pub fn from_file(path: &Path) -> Result<Self, ProposeError> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            ProposeError::Config(format!(
                "failed to read deployments file {}: {error}",
                path.display()
            ))
        })?;
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).map_err(|error| {
            ProposeError::Config(format!(
                "deployments file {} is not a name-to-address object: {error}",
                path.display()
            ))
        })?;
        Self::from_entries(parsed)
    }

    pub fn from_entries(entries: BTreeMap<String, String>) -> Result<Self, ProposeError> {
        let mut resolved = BTreeMap::new();
        for (name, raw_address) in entries {
            let address = parse_address(&raw_address).map_err(|_| {
                ProposeError::Config(format!(
                    "deployments entry {name} has invalid address {raw_address:?}"
                ))
            })?;
            resolved.insert(name, address);
        }
        Ok(Self { entries: resolved })
    }
}

impl ContractDirectory for StaticDirectory {
    fn lookup(&self, name: &str) -> ContractHandle {
        ContractHandle {
            name: name.to_string(),
            address: self.entries.get(name).copied(),
        }
    }
}
