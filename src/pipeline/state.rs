//! Run-level state machine.

use serde::Serialize;

/// Where a run is.
///
/// `Scanning -> AwaitingConfirmation -> Applying -> Done`, with `Cancelled`
/// reachable only from `AwaitingConfirmation` and `Done` also reachable from
/// `AwaitingConfirmation` (empty queue or dry run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Scanning,
    AwaitingConfirmation,
    Applying,
    Done,
    Cancelled,
}

/// A transition the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal pipeline transition: {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: PipelineState,
    pub to: PipelineState,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Cancelled)
    }

    /// Whether `self -> to` is allowed.
    pub fn can_advance_to(self, to: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, to),
            (Scanning, AwaitingConfirmation)
                | (AwaitingConfirmation, Applying)
                | (AwaitingConfirmation, Done)
                | (AwaitingConfirmation, Cancelled)
                | (Applying, Done)
        )
    }

    /// Move to `to`, or report the illegal transition.
    pub fn advance(&mut self, to: PipelineState) -> Result<(), IllegalTransition> {
        if !self.can_advance_to(to) {
            return Err(IllegalTransition { from: *self, to });
        }
        tracing::debug!(from = ?*self, ?to, "Pipeline state");
        *self = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn happy_path() {
        let mut state = Scanning;
        state.advance(AwaitingConfirmation).unwrap();
        state.advance(Applying).unwrap();
        state.advance(Done).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn cancel_only_from_confirmation() {
        let mut state = AwaitingConfirmation;
        state.advance(Cancelled).unwrap();
        assert!(state.is_terminal());

        for from in [Scanning, Applying, Done] {
            assert!(!from.can_advance_to(Cancelled), "{from:?}");
        }
    }

    #[test]
    fn rejects_skips_and_reversals() {
        let mut state = Scanning;
        assert_eq!(
            state.advance(Applying),
            Err(IllegalTransition { from: Scanning, to: Applying })
        );
        assert_eq!(state, Scanning);

        assert!(!Applying.can_advance_to(Scanning));
        assert!(!Done.can_advance_to(Applying));
        assert!(!Cancelled.can_advance_to(Done));
        assert!(!Scanning.can_advance_to(Done));
    }
}
