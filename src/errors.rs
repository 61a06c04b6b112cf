use crate::domain::types::TransitionError;
use thiserror::Error;

/// Everything that can go wrong between parsing the action flags and
/// reporting the new proposal id. None of these are retried automatically:
/// resubmitting after a timeout could create a duplicate proposal, so the
/// operator must verify on-chain state first.
#[derive(Debug, Error)]
pub enum ProposeError {
    #[error("invalid address {0:?}: must be a 0x-prefixed 20-byte hex string")]
    InvalidAddress(String),

    #[error("no governance action specified on the command line")]
    NoActionSpecified,

    #[error("more than one governance action specified: {0}")]
    AmbiguousAction(String),

    #[error("contract {name} has no known deployed address in the directory")]
    UnresolvedContract { name: String },

    #[error("failed to encode {signature}: {reason}")]
    Encoding { signature: String, reason: String },

    #[error("a proposal must contain at least one action")]
    EmptyProposal,

    #[error("rpc request failed: {0}")]
    Rpc(String),

    #[error(
        "transaction {tx_hash} did not reach {required} confirmations within {waited_secs}s; \
         verify on-chain state before retrying, the proposal may already exist"
    )]
    SubmissionTimeout {
        tx_hash: String,
        required: u64,
        waited_secs: u64,
    },

    #[error(
        "proposal counter moved from {before} to {after}; expected exactly one new proposal, \
         another proposer may have submitted concurrently"
    )]
    ConcurrentProposal { before: u64, after: u64 },

    #[error(
        "proposal counter is {actual} but --expected-count said {expected}; \
         a previous run may already have submitted this proposal"
    )]
    StaleCounter { expected: u64, actual: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}
