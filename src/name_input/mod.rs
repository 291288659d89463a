//! Hand-off of a player name from the UI thread to the simulation thread.
//!
//! The simulation calls [`NameInputBridge::request`] and then
//! [`NameInputBridge::poll`] once per tick. The UI thread answers with
//! [`NameInputBridge::supply`]. Neither side ever waits on the other.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

mod sanitize;

pub use sanitize::{is_usable_name, sanitize_player_name, MAX_NAME_LEN};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameInputState {
    Idle,
    AwaitingInput,
    Ready(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameInputError {
    #[error("a player name is already being requested")]
    AlreadyAwaitingInput,
    #[error("no player name has been requested")]
    NotAwaitingInput,
    #[error("the player name is empty after sanitization")]
    EmptyName,
}

/// The interactive surface that collects the name.
///
/// Both calls are made while the bridge's lock is held, so a show is never
/// overtaken by the hide that answers it. Implementations must only post the
/// change to their UI thread and never call back into the bridge.
pub trait NameInputSurface: Send + Sync {
    /// Makes the name prompt visible and focused.
    fn show_prompt(&self);
    fn hide_prompt(&self);
}

/// Surface for headless use.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSurface;

impl NameInputSurface for NoSurface {
    fn show_prompt(&self) {}
    fn hide_prompt(&self) {}
}

struct Shared {
    state: Mutex<NameInputState>,
    ready: Condvar,
    surface: Box<dyn NameInputSurface>,
}

/// Cloneable handle; every clone talks to the same request.
#[derive(Clone)]
pub struct NameInputBridge {
    shared: Arc<Shared>,
}

impl NameInputBridge {
    pub fn new(surface: impl NameInputSurface + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(NameInputState::Idle),
                ready: Condvar::new(),
                surface: Box::new(surface),
            }),
        }
    }

    pub fn headless() -> Self {
        Self::new(NoSurface)
    }

    fn lock(&self) -> MutexGuard<'_, NameInputState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> NameInputState {
        self.lock().clone()
    }

    /// Opens a new request, dropping any previous result, and shows the prompt.
    pub fn request(&self) -> Result<(), NameInputError> {
        let mut state = self.lock();
        if *state == NameInputState::AwaitingInput {
            return Err(NameInputError::AlreadyAwaitingInput);
        }
        *state = NameInputState::AwaitingInput;
        self.shared.surface.show_prompt();
        debug!("player name requested");
        Ok(())
    }

    /// Sanitizes `raw` and, if anything usable is left, completes the request.
    /// On [`NameInputError::EmptyName`] the request stays open.
    pub fn supply(&self, raw: &str) -> Result<(), NameInputError> {
        let name = sanitize_player_name(raw);
        let mut state = self.lock();
        if *state != NameInputState::AwaitingInput {
            return Err(NameInputError::NotAwaitingInput);
        }
        if !is_usable_name(&name) {
            debug!(raw, "ignoring unusable player name");
            return Err(NameInputError::EmptyName);
        }
        debug!(name = %name, "player name supplied");
        *state = NameInputState::Ready(name);
        self.shared.surface.hide_prompt();
        drop(state);
        self.shared.ready.notify_all();
        Ok(())
    }

    /// The supplied name, if there is one. Never blocks.
    pub fn poll(&self) -> Option<String> {
        match &*self.lock() {
            NameInputState::Ready(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Blocks up to `timeout` for the name. Only for consumers allowed to block.
    pub fn wait_for_name(&self, timeout: Duration) -> Option<String> {
        let guard = self.lock();
        let (guard, _) = self
            .shared
            .ready
            .wait_timeout_while(guard, timeout, |state| {
                *state == NameInputState::AwaitingInput
            })
            .unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            NameInputState::Ready(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Abandons an outstanding request.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if *state == NameInputState::AwaitingInput {
            self.shared.surface.hide_prompt();
            debug!("player name request cancelled");
        }
        *state = NameInputState::Idle;
        drop(state);
        self.shared.ready.notify_all();
    }
}

impl std::fmt::Debug for NameInputBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameInputBridge")
            .field("state", &self.state())
            .finish()
    }
}
