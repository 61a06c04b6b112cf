//! Command-line entrypoint. Picks exactly one governance action from the
//! flags, composes and encodes it, and either previews it (the default) or
//! submits it to the governor with `--do-it`.

use clap::Parser;
use governor_proposer::compose::{compose, GovernanceAction, GOVERNOR};
use governor_proposer::config::RuntimeConfig;
use governor_proposer::directory::{ContractDirectory, StaticDirectory};
use governor_proposer::domain::types::parse_address;
use governor_proposer::encoder::encode_proposal;
use governor_proposer::errors::ProposeError;
use governor_proposer::governor::HttpGovernorGateway;
use governor_proposer::rpc::HttpRpcClient;
use governor_proposer::submit::Submitter;
use log::info;

#[derive(Debug, Parser)]
#[command(
    name = "propose",
    about = "Compose and submit governance proposals to the governor contract"
)]
struct Cli {
    /// Call harvest() on the vault.
    #[arg(long)]
    harvest: bool,

    /// Point the vault at a new uniswap address (requires --address).
    #[arg(long)]
    set_uniswap_addr: bool,

    /// Upgrade the vault core implementation (requires --address).
    #[arg(long)]
    upgrade_vault_core: bool,

    /// Claim both oracles and switch the vault's price provider.
    #[arg(long)]
    upgrade_oracle: bool,

    /// Swap a deprecated strategy for new ones (requires --strategy and
    /// --deprecated).
    #[arg(long)]
    upgrade_strategies: bool,

    /// Address argument for actions that take one.
    #[arg(long)]
    address: Option<String>,

    /// Deployment name of a new strategy; repeatable.
    #[arg(long = "strategy")]
    strategies: Vec<String>,

    /// Address of the strategy being removed.
    #[arg(long)]
    deprecated: Option<String>,

    /// Actually submit the transaction. Without this flag the run is a
    /// dry run that touches nothing on chain.
    #[arg(long)]
    do_it: bool,

    /// Abort unless the governor's current proposal count matches. Guards
    /// a resumed run against submitting a duplicate.
    #[arg(long)]
    expected_count: Option<u64>,
}

impl Cli {
    fn selected_action(&self) -> Result<GovernanceAction, ProposeError> {
        let mut selected = Vec::new();
        if self.harvest {
            selected.push("--harvest");
        }
        if self.set_uniswap_addr {
            selected.push("--set-uniswap-addr");
        }
        if self.upgrade_vault_core {
            selected.push("--upgrade-vault-core");
        }
        if self.upgrade_oracle {
            selected.push("--upgrade-oracle");
        }
        if self.upgrade_strategies {
            selected.push("--upgrade-strategies");
        }
        match selected.as_slice() {
            [] => return Err(ProposeError::NoActionSpecified),
            [_] => {}
            many => return Err(ProposeError::AmbiguousAction(many.join(", "))),
        }

        if self.harvest {
            return Ok(GovernanceAction::Harvest);
        }
        if self.set_uniswap_addr {
            return Ok(GovernanceAction::SetUniswapAddr {
                address: parse_address(self.required_address("--set-uniswap-addr")?)?,
            });
        }
        if self.upgrade_vault_core {
            return Ok(GovernanceAction::UpgradeVaultCore {
                implementation: parse_address(self.required_address("--upgrade-vault-core")?)?,
            });
        }
        if self.upgrade_oracle {
            return Ok(GovernanceAction::UpgradeOracle);
        }
        if self.strategies.is_empty() {
            return Err(ProposeError::Config(
                "--upgrade-strategies needs at least one --strategy".to_string(),
            ));
        }
        let deprecated_raw = self.deprecated.as_deref().ok_or_else(|| {
            ProposeError::Config("--upgrade-strategies needs --deprecated".to_string())
        })?;
        Ok(GovernanceAction::UpgradeStrategies {
            new_strategies: self.strategies.clone(),
            deprecated: parse_address(deprecated_raw)?,
        })
    }

    fn required_address(&self, flag: &str) -> Result<&str, ProposeError> {
        self.address
            .as_deref()
            .ok_or_else(|| ProposeError::Config(format!("{flag} needs --address")))
    }
}

async fn run(cli: Cli) -> Result<(), ProposeError> {
    let config = RuntimeConfig::from_env()?;
    let action = cli.selected_action()?;
    info!("action {} on {}", action.name(), config.network);

    let directory = StaticDirectory::from_file(&config.deployments_file)?;
    let draft = compose(&action, &directory)?;
    let proposal = encode_proposal(draft)?;

    let governor = directory.lookup(GOVERNOR);
    let governor_address = governor
        .address
        .ok_or(ProposeError::UnresolvedContract {
            name: GOVERNOR.to_string(),
        })?;

    let rpc = HttpRpcClient::new(&config.provider_url, config.fallback_provider_url.clone());
    let gateway = HttpGovernorGateway::new(
        rpc,
        governor_address,
        config.deployer_address,
        config.gas_premium_pct,
    );

    let outcome = Submitter::new(&gateway, &config)
        .run(&proposal, cli.do_it, cli.expected_count)
        .await?;

    if let Some(preview) = &outcome.preview {
        println!("{preview}");
        println!("Use --do-it to actually submit the proposal.");
    }
    if let Some(id) = outcome.result.proposal_id {
        println!("New proposal count={id}");
    }
    if let Some(next_step) = &outcome.next_step {
        println!("Next step: {next_step}");
    }
    println!("Done");
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
