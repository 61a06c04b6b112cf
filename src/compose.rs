//! The proposal composer: maps a governance action to the concrete ordered
//! call list, resolving live contract addresses through the injected
//! directory at composition time. Read-only against chain state; composing
//! never submits anything.

use crate::abi::AbiValue;
use crate::directory::ContractDirectory;
use crate::domain::types::{ActionSpec, ContractHandle, ProposalDraft};
use crate::errors::ProposeError;
use alloy_primitives::{Address, U256};

pub const GOVERNOR: &str = "Governor";
pub const VAULT_PROXY: &str = "VaultProxy";
pub const VAULT_ADMIN: &str = "VaultAdmin";
pub const MIX_ORACLE: &str = "MixOracle";
pub const UNISWAP_ORACLE: &str = "OpenUniswapOracle";

/// 1e18. Each strategy supports a single asset, so the relative weight does
/// not matter and every strategy is added at the full nominal weight.
const NOMINAL_STRATEGY_WEIGHT: u64 = 1_000_000_000_000_000_000;

/// The recognized governance actions, each carrying its own parameters.
/// Adding a variant forces every dispatch site to handle it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernanceAction {
    /// Call `harvest()` on the vault's admin facet.
    Harvest,
    /// Point the vault at a new uniswap address.
    SetUniswapAddr { address: Address },
    /// Upgrade the vault core implementation behind the proxy.
    UpgradeVaultCore { implementation: Address },
    /// Claim governance over both price oracles, then make the mix oracle
    /// the vault's price provider.
    UpgradeOracle,
    /// Claim governance over each new strategy, remove the deprecated one,
    /// then add the new ones at nominal weight.
    UpgradeStrategies {
        new_strategies: Vec<String>,
        deprecated: Address,
    },
}

impl GovernanceAction {
    pub fn name(&self) -> &'static str {
        match self {
            GovernanceAction::Harvest => "harvest",
            GovernanceAction::SetUniswapAddr { .. } => "setUniswapAddr",
            GovernanceAction::UpgradeVaultCore { .. } => "upgradeVaultCore",
            GovernanceAction::UpgradeOracle => "upgradeOracle",
            GovernanceAction::UpgradeStrategies { .. } => "upgradeStrategies",
        }
    }
}

/// Build the ordered call specs and description for one action. Addresses
/// are resolved fresh on every call; nothing is cached between runs.
pub fn compose(
    action: &GovernanceAction,
    directory: &dyn ContractDirectory,
) -> Result<ProposalDraft, ProposeError> {
    let vault_admin = directory.facet(VAULT_ADMIN, &directory.lookup(VAULT_PROXY));
    match action {
        GovernanceAction::Harvest => Ok(ProposalDraft {
            specs: vec![ActionSpec::new(vault_admin, "harvest()", vec![])],
            description: "Call harvest".to_string(),
        }),
        GovernanceAction::SetUniswapAddr { address } => Ok(ProposalDraft {
            specs: vec![ActionSpec::new(
                vault_admin,
                "setUniswapAddr(address)",
                vec![AbiValue::Address(*address)],
            )],
            description: "Call setUniswapAddr".to_string(),
        }),
        GovernanceAction::UpgradeVaultCore { implementation } => Ok(ProposalDraft {
            // The proxy itself is the target here, not the admin facet.
            specs: vec![ActionSpec::new(
                directory.lookup(VAULT_PROXY),
                "upgradeTo(address)",
                vec![AbiValue::Address(*implementation)],
            )],
            description: "Upgrade VaultCore".to_string(),
        }),
        GovernanceAction::UpgradeOracle => {
            let mix_oracle = directory.lookup(MIX_ORACLE);
            let mix_address = resolved(&mix_oracle)?;
            let uniswap_oracle = directory.lookup(UNISWAP_ORACLE);
            // Governance must be claimed before the oracle can be trusted as
            // a provider. The governor does not enforce this ordering; this
            // list is the only place the invariant lives.
            Ok(ProposalDraft {
                specs: vec![
                    ActionSpec::new(mix_oracle, "claimGovernance()", vec![]),
                    ActionSpec::new(uniswap_oracle, "claimGovernance()", vec![]),
                    ActionSpec::new(
                        vault_admin,
                        "setPriceProvider(address)",
                        vec![AbiValue::Address(mix_address)],
                    ),
                ],
                description: "New MixOracle".to_string(),
            })
        }
        GovernanceAction::UpgradeStrategies {
            new_strategies,
            deprecated,
        } => {
            let mut specs = Vec::with_capacity(new_strategies.len() * 2 + 1);
            let mut new_addresses = Vec::with_capacity(new_strategies.len());
            for name in new_strategies {
                let strategy = directory.lookup(name);
                new_addresses.push(resolved(&strategy)?);
                specs.push(ActionSpec::new(strategy, "claimGovernance()", vec![]));
            }
            // Remove strictly before add: at no point may the old and new
            // strategies be live for the same asset at once.
            specs.push(ActionSpec::new(
                vault_admin.clone(),
                "removeStrategy(address)",
                vec![AbiValue::Address(*deprecated)],
            ));
            for address in new_addresses {
                specs.push(ActionSpec::new(
                    vault_admin.clone(),
                    "addStrategy(address,uint256)",
                    vec![
                        AbiValue::Address(address),
                        AbiValue::Uint(U256::from(NOMINAL_STRATEGY_WEIGHT)),
                    ],
                ));
            }
            Ok(ProposalDraft {
                specs,
                description: "Strategies upgrade".to_string(),
            })
        }
    }
}

fn resolved(handle: &ContractHandle) -> Result<Address, ProposeError> {
    handle
        .address
        .ok_or_else(|| ProposeError::UnresolvedContract {
            name: handle.name.clone(),
        })
}
