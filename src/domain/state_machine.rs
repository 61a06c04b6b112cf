use crate::domain::types::{SubmitterEvent, SubmitterState, TransitionError};

/// Legal submitter lifecycle: `Composed -> (DryRun | Submitted) -> Confirmed
/// -> Reported`, with `Failed` reachable from every non-terminal state.
/// `DryRun`, `Reported`, and `Failed` are terminal.
pub fn transition(
    current: &SubmitterState,
    event: &SubmitterEvent,
) -> Result<SubmitterState, TransitionError> {
    match (current, event) {
        (SubmitterState::Composed, SubmitterEvent::DryRunRequested) => Ok(SubmitterState::DryRun),
        (SubmitterState::Composed, SubmitterEvent::ProposeSent { .. }) => {
            Ok(SubmitterState::Submitted)
        }
        (SubmitterState::Submitted, SubmitterEvent::ConfirmationsObserved) => {
            Ok(SubmitterState::Confirmed)
        }
        (SubmitterState::Confirmed, SubmitterEvent::CountVerified) => Ok(SubmitterState::Reported),
        (
            SubmitterState::Composed | SubmitterState::Submitted | SubmitterState::Confirmed,
            SubmitterEvent::SubmissionFailed { .. },
        ) => Ok(SubmitterState::Failed),
        _ => Err(TransitionError {
            from: current.clone(),
            event: format!("{event:?}"),
            reason: "invalid transition".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propose_sent() -> SubmitterEvent {
        SubmitterEvent::ProposeSent {
            tx_hash: "0xabc".to_string(),
        }
    }

    fn failed() -> SubmitterEvent {
        SubmitterEvent::SubmissionFailed {
            reason: "boom".to_string(),
        }
    }

    #[test]
    fn happy_path_reaches_reported() {
        let state = transition(&SubmitterState::Composed, &propose_sent())
            .expect("composed accepts propose");
        let state = transition(&state, &SubmitterEvent::ConfirmationsObserved)
            .expect("submitted accepts confirmation");
        let state = transition(&state, &SubmitterEvent::CountVerified)
            .expect("confirmed accepts count verification");
        assert_eq!(state, SubmitterState::Reported);
    }

    #[test]
    fn dry_run_branches_directly_from_composed() {
        assert_eq!(
            transition(&SubmitterState::Composed, &SubmitterEvent::DryRunRequested)
                .expect("composed accepts dry-run"),
            SubmitterState::DryRun,
        );
    }

    #[test]
    fn failure_is_reachable_from_every_non_terminal_state() {
        for state in [
            SubmitterState::Composed,
            SubmitterState::Submitted,
            SubmitterState::Confirmed,
        ] {
            assert_eq!(
                transition(&state, &failed()).expect("non-terminal state accepts failure"),
                SubmitterState::Failed,
            );
        }
    }

    #[test]
    fn terminal_states_reject_further_events() {
        for state in [
            SubmitterState::DryRun,
            SubmitterState::Reported,
            SubmitterState::Failed,
        ] {
            transition(&state, &propose_sent()).expect_err("terminal state must reject events");
            transition(&state, &failed()).expect_err("terminal state must reject failure too");
        }
    }

    #[test]
    fn skipping_confirmation_is_rejected() {
        let state = transition(&SubmitterState::Composed, &propose_sent())
            .expect("composed accepts propose");
        transition(&state, &SubmitterEvent::CountVerified)
            .expect_err("submitted must not jump straight to reported");
    }
}
