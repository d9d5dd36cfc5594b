//! USSD session state.

use ril_ss_protocol::UssdState;

/// The last known USSD dialogue state.
///
/// Owned by the [`UssdLayer`](crate::UssdLayer); every read goes through
/// [`SessionState::current`] at the moment of use.
#[derive(Debug, Default)]
pub struct SessionState {
    state: UssdState,
}

impl SessionState {
    /// Create a session in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn current(&self) -> UssdState {
        self.state
    }

    /// Overwrite the state, returning the previous one.
    pub fn set(&mut self, state: UssdState) -> UssdState {
        let previous = std::mem::replace(&mut self.state, state);
        if previous != state {
            tracing::trace!(from = %previous, to = %state, "USSD session state changed");
        }
        previous
    }

    /// Return to the idle state.
    pub fn reset(&mut self) {
        self.set(UssdState::Idle);
    }
}
