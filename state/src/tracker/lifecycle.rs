use tracing::{debug, info, warn};

use super::client_state::ClientState;
use super::events::StateEvent;
use super::hooks::{HookId, HookRegistry, STATE_HOOKS};
use super::listener::Listeners;

/// Owns the session mirror of one connection and the hooks that keep it
/// up to date.
///
/// Nothing survives a reconnect: the store and every hook are created in
/// [`on_ready`](Self::on_ready) and torn down in [`on_lost`](Self::on_lost).
#[derive(Debug, Default)]
pub struct StateTracker {
    state: Option<ClientState>,
    attached: Vec<HookId>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&ClientState> {
        self.state.as_ref()
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut ClientState> {
        self.state.as_mut()
    }

    /// Connection is ready: fresh store, hooks attached, then announce it.
    pub fn on_ready(&mut self, hooks: &mut HookRegistry, listeners: &mut Listeners) {
        if self.is_ready() {
            warn!("connection ready while still tracking state, starting over");
            self.on_lost(hooks, listeners);
        }

        self.state = Some(ClientState::new());
        self.attach(hooks);
        info!(hooks = self.attached.len(), "state tracking started");

        if let Some(state) = self.state.as_ref() {
            listeners.notify(state, &StateEvent::StateReady);
        }
    }

    /// Connection is gone. Listeners hear about it while the outgoing store
    /// is still readable; only then are the hooks detached and the store
    /// dropped.
    pub fn on_lost(&mut self, hooks: &mut HookRegistry, listeners: &mut Listeners) {
        let Some(state) = self.state.as_ref() else {
            debug!("connection lost without tracked state");
            return;
        };

        listeners.notify(state, &StateEvent::StateNotReady);
        self.detach(hooks);
        self.state = None;
        info!("state tracking stopped");
    }

    fn attach(&mut self, hooks: &mut HookRegistry) {
        self.attached = STATE_HOOKS
            .iter()
            .map(|(key, hook)| hooks.register(*key, *hook))
            .collect();
    }

    fn detach(&mut self, hooks: &mut HookRegistry) {
        for id in self.attached.drain(..) {
            if !hooks.unregister(id) {
                warn!(?id, "state hook was already unregistered");
            }
        }
    }
}
