//
// Helix — local-controller state machine (§4.F).
//

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ControllerState {
    Init,
    Discovering,
    Stable,
    Degraded,
}

/// Inputs that can move the state machine. Kept separate from the event
/// types other components emit so the transition table stays a pure
/// function of (state, event).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FsmEvent {
    FirstLinkDiscovered,
    QuiescentForOnePollInterval,
    LinkDown,
    AllCandidatesRepathedAndAcked,
}

/// Pure transition function (§4.F). Returns `None` when the event has no
/// effect in the current state.
pub fn transition(state: ControllerState, event: FsmEvent) -> Option<ControllerState> {
    use ControllerState::*;
    use FsmEvent::*;

    match (state, event) {
        (Init, FirstLinkDiscovered) => Some(Discovering),
        (Discovering, QuiescentForOnePollInterval) => Some(Stable),
        (Stable, LinkDown) => Some(Degraded),
        (Degraded, LinkDown) => Some(Degraded),
        (Degraded, AllCandidatesRepathedAndAcked) => Some(Stable),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ControllerState::*;
    use FsmEvent::*;

    #[test]
    fn init_moves_to_discovering_on_first_link() {
        assert_eq!(
            transition(Init, FirstLinkDiscovered),
            Some(Discovering)
        );
    }

    #[test]
    fn discovering_moves_to_stable_once_quiescent() {
        assert_eq!(
            transition(Discovering, QuiescentForOnePollInterval),
            Some(Stable)
        );
    }

    #[test]
    fn stable_degrades_on_link_down_and_recovers_once_repathed() {
        assert_eq!(transition(Stable, LinkDown), Some(Degraded));
        assert_eq!(
            transition(Degraded, AllCandidatesRepathedAndAcked),
            Some(Stable)
        );
    }

    #[test]
    fn repeated_link_down_while_degraded_stays_degraded() {
        assert_eq!(transition(Degraded, LinkDown), Some(Degraded));
    }

    #[test]
    fn irrelevant_events_are_ignored() {
        assert_eq!(transition(Init, LinkDown), None);
        assert_eq!(transition(Stable, FirstLinkDiscovered), None);
    }
}
