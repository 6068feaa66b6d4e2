//! Submission state machine.
//!
//! [`step`] is a pure function from the current [`SubmissionState`] and an
//! incoming [`Signal`] to the next state plus the [`Effect`]s the controller
//! must run. The `loading` flag is the re-entrancy guard: while it is set,
//! a new submit only has its default prevented.

use serde::Serialize;

/// Where the current submit attempt is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// No submit attempt in progress.
    #[default]
    Idle,
    /// Waiting for native validity and the custom validation pass.
    AwaitingValidation,
    /// Validation passed; the submission is being dispatched.
    Submitting,
    /// The last attempt found errors.
    Blocked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionState {
    pub phase: Phase,
    pub loading: bool,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The submit event fired.
    Submit,
    /// Result of the native `checkValidity()` run right after a submit.
    NativeChecked { valid: bool },
    /// The custom validation pass of the submit attempt resolved.
    PassResolved { found_any_error: bool },
    /// A listener canceled the `submit` notification.
    SubmitCanceled,
    /// Native or remote dispatch finished, successfully or not.
    DispatchFinished,
}

/// Work the controller performs after a transition, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Prevent the default action of the triggering event.
    PreventDefault,
    /// Clear all error markers and tooltips under the form.
    ClearErrors,
    /// Run native `checkValidity()` and feed back `NativeChecked`.
    CheckNativeValidity,
    /// Start the custom validation pass over every declared-validator field.
    RunFullPass,
    /// Native validation failed; the per-field invalid events surface errors.
    SurfaceNativeErrors,
    /// Dispatch the submission (native or remote).
    Dispatch,
}

/// Compute the next state for `signal`.
pub fn step(state: SubmissionState, signal: Signal) -> (SubmissionState, Vec<Effect>) {
    use Effect::*;

    match (state.phase, signal) {
        (_, Signal::Submit) if state.loading => (state, vec![PreventDefault]),
        (_, Signal::Submit) => (
            SubmissionState {
                phase: Phase::AwaitingValidation,
                loading: true,
            },
            vec![PreventDefault, ClearErrors, CheckNativeValidity],
        ),

        (Phase::AwaitingValidation, Signal::NativeChecked { valid: true }) => {
            (state, vec![RunFullPass])
        }
        (Phase::AwaitingValidation, Signal::NativeChecked { valid: false }) => (
            SubmissionState {
                phase: Phase::Blocked,
                loading: false,
            },
            vec![SurfaceNativeErrors],
        ),

        (Phase::AwaitingValidation, Signal::PassResolved { found_any_error: true }) => (
            SubmissionState {
                phase: Phase::Blocked,
                loading: false,
            },
            Vec::new(),
        ),
        (Phase::AwaitingValidation, Signal::PassResolved { found_any_error: false }) => (
            SubmissionState {
                phase: Phase::Submitting,
                loading: true,
            },
            vec![Dispatch],
        ),

        (Phase::Submitting, Signal::SubmitCanceled | Signal::DispatchFinished) => (
            SubmissionState {
                phase: Phase::Idle,
                loading: false,
            },
            Vec::new(),
        ),

        (phase, signal) => {
            log::debug!("[machine] ignoring {:?} in {:?}", signal, phase);
            (state, Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(phase: Phase, loading: bool) -> SubmissionState {
        SubmissionState { phase, loading }
    }

    #[test]
    fn test_submit_starts_validation() {
        let (next, effects) = step(SubmissionState::default(), Signal::Submit);
        assert_eq!(next, state(Phase::AwaitingValidation, true));
        assert_eq!(
            effects,
            vec![
                Effect::PreventDefault,
                Effect::ClearErrors,
                Effect::CheckNativeValidity
            ]
        );
    }

    #[test]
    fn test_submit_while_loading_is_guarded() {
        for phase in [Phase::AwaitingValidation, Phase::Submitting] {
            let current = state(phase, true);
            let (next, effects) = step(current, Signal::Submit);
            assert_eq!(next, current);
            assert_eq!(effects, vec![Effect::PreventDefault]);
        }
    }

    #[test]
    fn test_blocked_form_can_resubmit() {
        let (next, _) = step(state(Phase::Blocked, false), Signal::Submit);
        assert_eq!(next, state(Phase::AwaitingValidation, true));
    }

    #[test]
    fn test_native_invalid_blocks_and_clears_loading() {
        let (next, effects) = step(
            state(Phase::AwaitingValidation, true),
            Signal::NativeChecked { valid: false },
        );
        assert_eq!(next, state(Phase::Blocked, false));
        assert_eq!(effects, vec![Effect::SurfaceNativeErrors]);
    }

    #[test]
    fn test_native_valid_runs_pass() {
        let current = state(Phase::AwaitingValidation, true);
        let (next, effects) = step(current, Signal::NativeChecked { valid: true });
        assert_eq!(next, current);
        assert_eq!(effects, vec![Effect::RunFullPass]);
    }

    #[test]
    fn test_pass_result_decides() {
        let current = state(Phase::AwaitingValidation, true);

        let (blocked, effects) = step(current, Signal::PassResolved { found_any_error: true });
        assert_eq!(blocked, state(Phase::Blocked, false));
        assert!(effects.is_empty());

        let (submitting, effects) = step(current, Signal::PassResolved { found_any_error: false });
        assert_eq!(submitting, state(Phase::Submitting, true));
        assert_eq!(effects, vec![Effect::Dispatch]);
    }

    #[test]
    fn test_dispatch_end_returns_to_idle() {
        let current = state(Phase::Submitting, true);
        assert_eq!(step(current, Signal::DispatchFinished).0, state(Phase::Idle, false));
        assert_eq!(step(current, Signal::SubmitCanceled).0, state(Phase::Idle, false));
    }

    #[test]
    fn test_stale_signals_ignored() {
        let idle = SubmissionState::default();
        assert_eq!(step(idle, Signal::DispatchFinished), (idle, Vec::new()));
        assert_eq!(
            step(idle, Signal::PassResolved { found_any_error: false }),
            (idle, Vec::new())
        );
    }
}
