//! Client connection state machine.

/// Lifecycle state of a chat client endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    /// No open connection; host and port may be changed.
    #[default]
    Disconnected,
    /// Connected and logged in to the server.
    Connected,
    /// The client has quit; the owning loop must shut down.
    Terminated,
}

impl ClientState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Disconnected -> Connected (`#login` or construction)
    /// - Connected -> Disconnected (`#logoff` or graceful close)
    /// - Disconnected | Connected -> Terminated (`#quit`, peer shutdown, send failure)
    pub fn can_transition_to(&self, target: ClientState) -> bool {
        use ClientState::*;
        matches!(
            (*self, target),
            (Disconnected, Connected)
                | (Connected, Disconnected)
                | (Disconnected, Terminated)
                | (Connected, Terminated)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: ClientState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::ChatError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientState::Terminated)
    }
}
