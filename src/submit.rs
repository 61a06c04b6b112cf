//! The proposal submitter. Drives the lifecycle state machine: dry-run by
//! default, otherwise submit, wait out the network's confirmation policy,
//! verify the counter advanced by exactly one, and report the new id.

use crate::config::{Network, RuntimeConfig};
use crate::domain::state_machine::transition;
use crate::domain::types::{Proposal, SubmissionResult, SubmitterEvent, SubmitterState};
use crate::errors::ProposeError;
use crate::governor::GovernorGateway;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::Instant;

pub struct Submitter<'a> {
    gateway: &'a dyn GovernorGateway,
    network: Network,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

/// What a completed run hands back to the caller, alongside the terminal
/// state for reporting.
#[derive(Clone, Debug)]
pub struct SubmissionOutcome {
    pub result: SubmissionResult,
    pub final_state: SubmitterState,
    /// Queuing needs a separate privileged multi-sig actor, so it is
    /// reported as an instruction rather than performed.
    pub next_step: Option<String>,
    /// Dry-run rendering of the encoded proposal.
    pub preview: Option<String>,
}

impl<'a> Submitter<'a> {
    pub fn new(gateway: &'a dyn GovernorGateway, config: &RuntimeConfig) -> Self {
        Self {
            gateway,
            network: config.network.clone(),
            confirmation_timeout: config.confirmation_timeout,
            poll_interval: config.poll_interval,
        }
    }

    /// Shorter waits for tests and impatient local runs.
    pub fn with_timing(mut self, confirmation_timeout: Duration, poll_interval: Duration) -> Self {
        self.confirmation_timeout = confirmation_timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Run a composed proposal through to a terminal state. `do_it` false
    /// (the default posture) makes no network calls at all; `expected_count`
    /// lets an operator resuming an interrupted run guard against submitting
    /// a duplicate.
    pub async fn run(
        &self,
        proposal: &Proposal,
        do_it: bool,
        expected_count: Option<u64>,
    ) -> Result<SubmissionOutcome, ProposeError> {
        let state = SubmitterState::Composed;

        if !do_it {
            let state = transition(&state, &SubmitterEvent::DryRunRequested)?;
            info!(
                "dry run: would send a tx calling propose() on {}",
                self.gateway.governor_address()
            );
            return Ok(SubmissionOutcome {
                result: SubmissionResult {
                    proposal_id: None,
                    transaction_hash: None,
                },
                final_state: state,
                next_step: None,
                preview: Some(proposal.render_preview()),
            });
        }

        let before = self.fail(&state, self.gateway.proposal_count().await)?;
        info!("current proposal count={before}");
        if let Some(expected) = expected_count {
            if expected != before {
                return self.fail(&state, Err(ProposeError::StaleCounter {
                    expected,
                    actual: before,
                }));
            }
        }

        info!(
            "sending a tx calling propose() on {}",
            self.gateway.governor_address()
        );
        let tx_hash = self.fail(&state, self.gateway.send_propose(proposal).await)?;
        let state = transition(
            &state,
            &SubmitterEvent::ProposeSent {
                tx_hash: tx_hash.clone(),
            },
        )?;
        info!("sent, tx hash {tx_hash}");

        let required = self.network.required_confirmations();
        if required > 0 {
            info!("waiting for {required} confirmations on {}", self.network);
            self.fail(&state, self.await_confirmations(&tx_hash, required).await)?;
        }
        let state = transition(&state, &SubmitterEvent::ConfirmationsObserved)?;

        let after = self.fail(&state, self.gateway.proposal_count().await)?;
        if after != before + 1 {
            return self.fail(&state, Err(ProposeError::ConcurrentProposal { before, after }));
        }
        let state = transition(&state, &SubmitterEvent::CountVerified)?;
        info!("new proposal count={after}");

        Ok(SubmissionOutcome {
            result: SubmissionResult {
                proposal_id: Some(after),
                transaction_hash: Some(tx_hash),
            },
            final_state: state,
            next_step: Some(format!(
                "call queue({after}) on the governor at {} via multi-sig",
                self.gateway.governor_address()
            )),
            preview: None,
        })
    }

    async fn await_confirmations(
        &self,
        tx_hash: &str,
        required: u64,
    ) -> Result<(), ProposeError> {
        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            match self.gateway.tx_confirmations(tx_hash).await? {
                Some(confirmations) if confirmations >= required => return Ok(()),
                Some(confirmations) => {
                    debug!("{confirmations}/{required} confirmations for {tx_hash}")
                }
                None => debug!("{tx_hash} still pending"),
            }
            if Instant::now() >= deadline {
                // Deliberately no resubmission here: the tx may still land,
                // and a second propose() would create a duplicate proposal.
                return Err(ProposeError::SubmissionTimeout {
                    tx_hash: tx_hash.to_string(),
                    required,
                    waited_secs: self.confirmation_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Record the failure transition for bookkeeping, then propagate the
    /// error unchanged.
    fn fail<T>(
        &self,
        state: &SubmitterState,
        result: Result<T, ProposeError>,
    ) -> Result<T, ProposeError> {
        if let Err(error) = &result {
            warn!("submitter failed in {state:?}: {error}");
            let _ = transition(
                state,
                &SubmitterEvent::SubmissionFailed {
                    reason: error.to_string(),
                },
            );
        }
        result
    }
}
