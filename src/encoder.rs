//! The action encoder: a pure transformation from author-facing call specs
//! to the encoded actions the governor's `propose` operation expects.

use crate::abi;
use crate::domain::types::{Action, ActionSpec, Proposal, ProposalDraft};
use crate::errors::ProposeError;

/// Encode an ordered list of specs. Position `i` of the output always
/// derives from position `i` of the input; no reordering, no side effects.
pub fn encode_actions(specs: &[ActionSpec]) -> Result<Vec<Action>, ProposeError> {
    specs
        .iter()
        .map(|spec| {
            let target = spec
                .contract
                .address
                .ok_or_else(|| ProposeError::UnresolvedContract {
                    name: spec.contract.name.clone(),
                })?;
            let call_data = abi::encode_call(&spec.signature, &spec.args).map_err(|err| {
                ProposeError::Encoding {
                    signature: err.signature,
                    reason: err.reason,
                }
            })?;
            Ok(Action {
                target,
                call_data,
                signature: spec.signature.clone(),
            })
        })
        .collect()
}

/// Encode a composed draft into a submission-ready proposal.
pub fn encode_proposal(draft: ProposalDraft) -> Result<Proposal, ProposeError> {
    if draft.specs.is_empty() {
        return Err(ProposeError::EmptyProposal);
    }
    Ok(Proposal {
        actions: encode_actions(&draft.specs)?,
        description: draft.description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::AbiValue;
    use crate::domain::types::ContractHandle;
    use alloy_primitives::{Address, U256};

    fn handle(name: &str, byte: u8) -> ContractHandle {
        ContractHandle {
            name: name.to_string(),
            address: Some(Address::repeat_byte(byte)),
        }
    }

    #[test]
    fn encode_actions_preserves_input_order() {
        let specs = vec![
            ActionSpec::new(handle("MixOracle", 0x01), "claimGovernance()", vec![]),
            ActionSpec::new(handle("OpenUniswapOracle", 0x02), "claimGovernance()", vec![]),
            ActionSpec::new(
                handle("VaultAdmin", 0x03),
                "setPriceProvider(address)",
                vec![AbiValue::Address(Address::repeat_byte(0x01))],
            ),
        ];
        let actions = encode_actions(&specs).expect("well-formed specs should encode");
        assert_eq!(actions.len(), 3);
        for (index, action) in actions.iter().enumerate() {
            assert_eq!(action.target, specs[index].contract.address.unwrap());
            assert_eq!(action.signature, specs[index].signature);
        }
    }

    #[test]
    fn unresolved_contract_fails_the_whole_batch() {
        let specs = vec![
            ActionSpec::new(handle("VaultAdmin", 0x03), "harvest()", vec![]),
            ActionSpec::new(
                ContractHandle {
                    name: "MissingOracle".to_string(),
                    address: None,
                },
                "claimGovernance()",
                vec![],
            ),
        ];
        let err = encode_actions(&specs).expect_err("unresolved handle must fail");
        assert!(
            matches!(err, ProposeError::UnresolvedContract { ref name } if name == "MissingOracle"),
            "{err}"
        );
    }

    #[test]
    fn argument_mismatch_surfaces_as_encoding_error() {
        let specs = vec![ActionSpec::new(
            handle("VaultAdmin", 0x03),
            "setUniswapAddr(address)",
            vec![AbiValue::Uint(U256::from(1u64))],
        )];
        let err = encode_actions(&specs).expect_err("type mismatch must fail");
        assert!(matches!(err, ProposeError::Encoding { .. }), "{err}");
    }

    #[test]
    fn empty_draft_is_rejected() {
        let err = encode_proposal(ProposalDraft {
            specs: vec![],
            description: "empty".to_string(),
        })
        .expect_err("a proposal needs at least one action");
        assert!(matches!(err, ProposeError::EmptyProposal), "{err}");
    }
}
