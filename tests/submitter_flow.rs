//! End-to-end submitter lifecycle tests against a scripted gateway.

use alloy_primitives::Address;
use async_trait::async_trait;
use governor_proposer::config::{Network, RuntimeConfig};
use governor_proposer::domain::types::{Action, Proposal, SubmitterState};
use governor_proposer::errors::ProposeError;
use governor_proposer::governor::GovernorGateway;
use governor_proposer::submit::Submitter;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

const TX_HASH: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";

/// Gateway whose responses are scripted up front. Every call is recorded so
/// tests can assert what the submitter did and did not touch.
struct ScriptedGateway {
    counts: Mutex<VecDeque<u64>>,
    confirmations: Mutex<VecDeque<Option<u64>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn new(counts: &[u64], confirmations: &[Option<u64>]) -> Self {
        Self {
            counts: Mutex::new(counts.iter().copied().collect()),
            confirmations: Mutex::new(confirmations.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().expect("calls lock").push(call.to_string());
    }
}

#[async_trait]
impl GovernorGateway for ScriptedGateway {
    fn governor_address(&self) -> Address {
        Address::repeat_byte(0x60)
    }

    async fn proposal_count(&self) -> Result<u64, ProposeError> {
        self.record("proposal_count");
        self.counts
            .lock()
            .expect("counts lock")
            .pop_front()
            .ok_or_else(|| ProposeError::Rpc("scripted counts exhausted".to_string()))
    }

    async fn send_propose(&self, _proposal: &Proposal) -> Result<String, ProposeError> {
        self.record("send_propose");
        Ok(TX_HASH.to_string())
    }

    async fn tx_confirmations(&self, _tx_hash: &str) -> Result<Option<u64>, ProposeError> {
        self.record("tx_confirmations");
        // An exhausted script means the tx stays pending.
        Ok(self
            .confirmations
            .lock()
            .expect("confirmations lock")
            .pop_front()
            .flatten())
    }
}

fn config_for(network: Network) -> RuntimeConfig {
    RuntimeConfig {
        network,
        provider_url: "http://localhost:8545".to_string(),
        fallback_provider_url: None,
        deployer_address: Address::repeat_byte(0x70),
        gas_premium_pct: 0,
        deployments_file: PathBuf::from("deployments.json"),
        confirmation_timeout: Duration::from_secs(1),
        poll_interval: Duration::from_millis(5),
    }
}

fn sample_proposal() -> Proposal {
    Proposal {
        actions: vec![Action {
            target: Address::repeat_byte(0x01),
            call_data: vec![0x12, 0x34, 0x56, 0x78],
            signature: "harvest()".to_string(),
        }],
        description: "Call harvest".to_string(),
    }
}

#[tokio::test]
async fn dry_run_makes_no_network_calls_and_is_repeatable() {
    let gateway = ScriptedGateway::new(&[], &[]);
    let config = config_for(Network::Mainnet);
    let submitter = Submitter::new(&gateway, &config);
    let proposal = sample_proposal();

    let first = submitter
        .run(&proposal, false, None)
        .await
        .expect("dry run should succeed");
    let second = submitter
        .run(&proposal, false, None)
        .await
        .expect("repeated dry run should succeed");

    assert_eq!(first.final_state, SubmitterState::DryRun);
    assert_eq!(first.result.proposal_id, None);
    assert_eq!(first.result.transaction_hash, None);
    assert_eq!(first.preview, second.preview, "dry runs must be identical");
    assert!(first.preview.as_deref().is_some_and(|p| p.contains("harvest()")));
    assert!(gateway.recorded_calls().is_empty(), "dry run must not touch the chain");
}

#[tokio::test]
async fn successful_submission_reports_the_new_count_and_queue_step() {
    let gateway = ScriptedGateway::new(&[7, 8], &[Some(1), Some(3)]);
    let config = config_for(Network::Mainnet);
    let submitter = Submitter::new(&gateway, &config);

    let outcome = submitter
        .run(&sample_proposal(), true, None)
        .await
        .expect("submission should succeed");

    assert_eq!(outcome.final_state, SubmitterState::Reported);
    assert_eq!(outcome.result.proposal_id, Some(8));
    assert_eq!(outcome.result.transaction_hash.as_deref(), Some(TX_HASH));
    assert!(
        outcome
            .next_step
            .as_deref()
            .is_some_and(|step| step.contains("queue(8)")),
        "{:?}",
        outcome.next_step
    );
    assert_eq!(
        gateway.recorded_calls().first().map(String::as_str),
        Some("proposal_count")
    );
    assert_eq!(
        gateway.recorded_calls().last().map(String::as_str),
        Some("proposal_count")
    );
}

#[tokio::test]
async fn count_advancing_by_more_than_one_is_a_concurrency_error() {
    let gateway = ScriptedGateway::new(&[7, 9], &[Some(3)]);
    let config = config_for(Network::Mainnet);
    let submitter = Submitter::new(&gateway, &config);

    let err = submitter
        .run(&sample_proposal(), true, None)
        .await
        .expect_err("count jump must fail");
    assert!(
        matches!(err, ProposeError::ConcurrentProposal { before: 7, after: 9 }),
        "{err}"
    );
}

#[tokio::test]
async fn unconfirmed_transaction_times_out_without_resubmitting() {
    let gateway = ScriptedGateway::new(&[7], &[]);
    let config = config_for(Network::Mainnet);
    let submitter = Submitter::new(&gateway, &config)
        .with_timing(Duration::from_millis(30), Duration::from_millis(5));

    let err = submitter
        .run(&sample_proposal(), true, None)
        .await
        .expect_err("pending-forever tx must time out");
    assert!(matches!(err, ProposeError::SubmissionTimeout { .. }), "{err}");
    let sends = gateway
        .recorded_calls()
        .iter()
        .filter(|call| call.as_str() == "send_propose")
        .count();
    assert_eq!(sends, 1, "propose must never be resubmitted");
}

#[tokio::test]
async fn dev_networks_skip_the_confirmation_wait() {
    let gateway = ScriptedGateway::new(&[3, 4], &[]);
    let config = config_for(Network::Dev("localhost".to_string()));
    let submitter = Submitter::new(&gateway, &config);

    let outcome = submitter
        .run(&sample_proposal(), true, None)
        .await
        .expect("dev submission should succeed");

    assert_eq!(outcome.final_state, SubmitterState::Reported);
    assert_eq!(outcome.result.proposal_id, Some(4));
    assert!(
        !gateway
            .recorded_calls()
            .iter()
            .any(|call| call == "tx_confirmations"),
        "zero-confirmation networks must not poll"
    );
}

#[tokio::test]
async fn stale_expected_count_aborts_before_sending() {
    let gateway = ScriptedGateway::new(&[7], &[]);
    let config = config_for(Network::Mainnet);
    let submitter = Submitter::new(&gateway, &config);

    let err = submitter
        .run(&sample_proposal(), true, Some(9))
        .await
        .expect_err("stale count must fail");
    assert!(
        matches!(err, ProposeError::StaleCounter { expected: 9, actual: 7 }),
        "{err}"
    );
    assert!(
        !gateway.recorded_calls().iter().any(|call| call == "send_propose"),
        "nothing may be sent after a stale count"
    );
}
