//! Protocol state machine guarding method access per session.

use std::fmt;
use std::sync::Mutex;

use thiserror::Error;

/// Lifecycle of one MCP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpState {
    /// No handshake started; only `initialize` is accepted.
    Uninitialized,
    /// `initialize` answered, waiting for `notifications/initialized`.
    Initializing,
    /// Handshake complete; all methods accepted.
    Ready,
}

impl fmt::Display for McpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            McpState::Uninitialized => "uninitialized",
            McpState::Initializing => "initializing",
            McpState::Ready => "ready",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum McpStateError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: McpState, to: McpState },
    #[error("Method requires state {required}, session is {current}")]
    WrongState { required: McpState, current: McpState },
}

/// Tracks the handshake state of a single session.
pub struct McpStateMachine {
    state: Mutex<McpState>,
}

impl McpStateMachine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(McpState::Uninitialized),
        }
    }

    pub fn current(&self) -> McpState {
        *self.lock()
    }

    /// Fail unless the session is exactly in `required`.
    pub fn require(&self, required: McpState) -> Result<(), McpStateError> {
        let current = self.current();
        if current == required {
            Ok(())
        } else {
            Err(McpStateError::WrongState { required, current })
        }
    }

    pub fn require_ready(&self) -> Result<(), McpStateError> {
        self.require(McpState::Ready)
    }

    /// Advance the handshake. Only the forward edges
    /// Uninitialized → Initializing → Ready are valid.
    pub fn transition(&self, to: McpState) -> Result<(), McpStateError> {
        let mut state = self.lock();
        let valid = matches!(
            (*state, to),
            (McpState::Uninitialized, McpState::Initializing)
                | (McpState::Initializing, McpState::Ready)
        );
        if !valid {
            return Err(McpStateError::InvalidTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, McpState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for McpStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uninitialized() {
        let machine = McpStateMachine::new();
        assert_eq!(machine.current(), McpState::Uninitialized);
        assert!(machine.require(McpState::Uninitialized).is_ok());
        assert!(machine.require_ready().is_err());
    }

    #[test]
    fn walks_the_handshake() {
        let machine = McpStateMachine::new();
        machine.transition(McpState::Initializing).unwrap();
        machine.transition(McpState::Ready).unwrap();
        assert!(machine.require_ready().is_ok());
    }

    #[test]
    fn rejects_skipping_initializing() {
        let machine = McpStateMachine::new();
        let result = machine.transition(McpState::Ready);
        assert!(matches!(result, Err(McpStateError::InvalidTransition { .. })));
        assert_eq!(machine.current(), McpState::Uninitialized);
    }

    #[test]
    fn rejects_re_initialize() {
        let machine = McpStateMachine::new();
        machine.transition(McpState::Initializing).unwrap();
        assert!(machine.transition(McpState::Initializing).is_err());
    }
}
