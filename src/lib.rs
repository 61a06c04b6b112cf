pub mod abi;
pub mod compose;
pub mod config;
pub mod directory;
pub mod domain;
pub mod encoder;
pub mod errors;
pub mod governor;
pub mod rpc;
pub mod submit;
#[cfg(test)]
pub(crate) mod test_support;

pub use compose::{compose, GovernanceAction};
pub use config::{Network, RuntimeConfig};
pub use directory::{ContractDirectory, StaticDirectory};
pub use domain::types::{
    Action, ActionSpec, ContractHandle, Proposal, ProposalDraft, SubmissionResult, SubmitterState,
};
pub use encoder::{encode_actions, encode_proposal};
pub use errors::ProposeError;
pub use governor::{GovernorGateway, HttpGovernorGateway};
pub use rpc::HttpRpcClient;
pub use submit::{SubmissionOutcome, Submitter};
