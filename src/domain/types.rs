use crate::abi::AbiValue;
use crate::errors::ProposeError;
use alloy_primitives::Address;
use std::str::FromStr;
use thiserror::Error;

/// A named contract plus its deployed address, if the directory knows one.
/// Admin facets behind a proxy share the proxy's address under their own name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractHandle {
    pub name: String,
    pub address: Option<Address>,
}

/// Author-facing description of one intended contract call. The signature is
/// the canonical function signature string (name plus parenthesized parameter
/// types, no spaces), used both for ABI encoding and for the human-readable
/// proposal log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionSpec {
    pub contract: ContractHandle,
    pub signature: String,
    pub args: Vec<AbiValue>,
}

impl ActionSpec {
    pub fn new(contract: ContractHandle, signature: &str, args: Vec<AbiValue>) -> Self {
        Self {
            contract,
            signature: signature.to_string(),
            args,
        }
    }
}

/// One encoded call within a proposal. Immutable once encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub target: Address,
    pub call_data: Vec<u8>,
    pub signature: String,
}

/// Composer output: the ordered call specs plus a description, before any
/// ABI encoding has happened.
#[derive(Clone, Debug)]
pub struct ProposalDraft {
    pub specs: Vec<ActionSpec>,
    pub description: String,
}

/// An ordered batch of encoded calls ready for submission. Ordering is
/// semantically significant: the governor executes the actions in sequence.
#[derive(Clone, Debug)]
pub struct Proposal {
    pub actions: Vec<Action>,
    pub description: String,
}

impl Proposal {
    /// The (targets, call data, signatures) triple the governor's `propose`
    /// operation expects. Position `i` of each vector describes action `i`.
    pub fn as_triple(&self) -> (Vec<Address>, Vec<Vec<u8>>, Vec<String>) {
        let targets = self.actions.iter().map(|action| action.target).collect();
        let call_datas = self
            .actions
            .iter()
            .map(|action| action.call_data.clone())
            .collect();
        let signatures = self
            .actions
            .iter()
            .map(|action| action.signature.clone())
            .collect();
        (targets, call_datas, signatures)
    }

    /// Deterministic operator-facing rendering, used verbatim in dry-run mode.
    pub fn render_preview(&self) -> String {
        let mut lines = vec![format!("description: {}", self.description)];
        for (index, action) in self.actions.iter().enumerate() {
            lines.push(format!(
                "  [{index}] {} {} data=0x{}",
                action.target,
                action.signature,
                hex::encode(&action.call_data),
            ));
        }
        lines.join("\n")
    }
}

/// What a finished (non-failed) run reports. `proposal_id` and
/// `transaction_hash` are both `None` in dry-run mode, which makes no
/// network calls at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionResult {
    pub proposal_id: Option<u64>,
    pub transaction_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitterState {
    Composed,
    DryRun,
    Submitted,
    Confirmed,
    Reported,
    Failed,
}

#[derive(Clone, Debug)]
pub enum SubmitterEvent {
    DryRunRequested,
    ProposeSent { tx_hash: String },
    ConfirmationsObserved,
    CountVerified,
    SubmissionFailed { reason: String },
}

#[derive(Clone, Debug, Error)]
#[error("invalid submitter transition from {from:?} on {event}: {reason}")]
pub struct TransitionError {
    pub from: SubmitterState,
    pub event: String,
    pub reason: String,
}

/// Address-format validator applied to operator input before any composition
/// or network interaction is attempted.
pub fn parse_address(raw: &str) -> Result<Address, ProposeError> {
    let trimmed = raw.trim();
    let shape_ok = trimmed.len() == 42
        && trimmed.starts_with("0x")
        && trimmed
            .as_bytes()
            .iter()
            .skip(2)
            .all(|byte| byte.is_ascii_hexdigit());
    if !shape_ok {
        return Err(ProposeError::InvalidAddress(raw.to_string()));
    }
    Address::from_str(trimmed).map_err(|_| ProposeError::InvalidAddress(raw.to_string()))
}
