//! Signal handling for `workflow run` (SIGINT/SIGTERM)
//!
//! On the first signal the running workflow is cancelled at its next poll:
//! the current state's containers are stopped, the instance is persisted as
//! CANCELLED and the process exits with [`EXIT_CODE_CANCELLED`].
//!
//! A second signal exits immediately. The instance keeps whatever status was
//! last persisted.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

/// Exit code for cancelled workflows
pub const EXIT_CODE_CANCELLED: i32 = 80;

/// Exit code after a second interrupt
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Signal handler state
#[derive(Debug, Default)]
pub struct SignalState {
    cancel_requested: AtomicBool,
    immediate_exit: AtomicBool,
    signal_count: AtomicU8,
    /// Workflow instance being driven, for log context
    instance_id: Mutex<Option<String>>,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Second signal received
    pub fn is_immediate_exit(&self) -> bool {
        self.immediate_exit.load(Ordering::SeqCst)
    }

    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Record a signal and return the action to take
    pub fn handle_signal(&self) -> SignalAction {
        match self.signal_count.fetch_add(1, Ordering::SeqCst) {
            0 => {
                self.cancel_requested.store(true, Ordering::SeqCst);
                SignalAction::CancelWorkflow
            }
            1 => {
                self.immediate_exit.store(true, Ordering::SeqCst);
                SignalAction::ImmediateExit
            }
            _ => SignalAction::Ignore,
        }
    }

    pub fn set_instance_id(&self, instance_id: &str) {
        if let Ok(mut id) = self.instance_id.lock() {
            *id = Some(instance_id.to_string());
        }
    }

    pub fn instance_id(&self) -> Option<String> {
        self.instance_id.lock().ok().and_then(|id| id.clone())
    }
}

/// Action to take after receiving a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First signal: cancel the running workflow
    CancelWorkflow,
    /// Second signal: exit now
    ImmediateExit,
    Ignore,
}

/// Installs the process-wide handler over a shared [`SignalState`]
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::with_state(Arc::new(SignalState::new()))
    }

    pub fn with_state(state: Arc<SignalState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> Arc<SignalState> {
        Arc::clone(&self.state)
    }

    /// Install the handler. Must be called at most once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || {
            let instance = state.instance_id().unwrap_or_default();
            match state.handle_signal() {
                SignalAction::CancelWorkflow => {
                    warn!(instance_id = %instance, "interrupt received, cancelling workflow");
                }
                SignalAction::ImmediateExit => {
                    warn!(instance_id = %instance, "second interrupt, exiting immediately");
                    std::process::exit(EXIT_CODE_INTERRUPTED);
                }
                SignalAction::Ignore => {}
            }
        })
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
