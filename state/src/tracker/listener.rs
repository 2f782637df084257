use tracing::trace;

use super::client_state::ClientState;
use super::events::StateEvent;
use super::state::{ConnectionState, PlayerState};
use crate::types::{Plid, Ucid};

/// Readonly view into the session mirror.
///
/// Subscribers only ever get this, never the mutable store.
pub trait StateView {
    fn player_by_plid(&self, plid: Plid) -> Option<&PlayerState>;

    fn player_by_ucid(&self, ucid: Ucid) -> Option<&PlayerState>;

    fn connection_by_ucid(&self, ucid: Ucid) -> Option<&ConnectionState>;

    fn connection_by_plid(&self, plid: Plid) -> Option<&ConnectionState>;

    /// Number of tracked connections
    fn connection_count(&self) -> usize;

    /// Number of tracked players
    fn player_count(&self) -> usize;

    /// Whether we are attached to a host rather than a local game
    fn is_host(&self) -> bool;

    fn track(&self) -> &str;
}

impl StateView for ClientState {
    fn player_by_plid(&self, plid: Plid) -> Option<&PlayerState> {
        ClientState::player_by_plid(self, plid)
    }

    fn player_by_ucid(&self, ucid: Ucid) -> Option<&PlayerState> {
        ClientState::player_by_ucid(self, ucid)
    }

    fn connection_by_ucid(&self, ucid: Ucid) -> Option<&ConnectionState> {
        ClientState::connection_by_ucid(self, ucid)
    }

    fn connection_by_plid(&self, plid: Plid) -> Option<&ConnectionState> {
        ClientState::connection_by_plid(self, plid)
    }

    fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn player_count(&self) -> usize {
        self.players.len()
    }

    fn is_host(&self) -> bool {
        self.host
    }

    fn track(&self) -> &str {
        ClientState::track(self)
    }
}

/// Subscriber to state notifications.
///
/// Called synchronously from the dispatch loop, after the handler that
/// produced the event has finished mutating the store.
pub trait StateListener {
    fn on_event(&mut self, state: &dyn StateView, event: &StateEvent);
}

impl<F> StateListener for F
where
    F: FnMut(&dyn StateView, &StateEvent),
{
    fn on_event(&mut self, state: &dyn StateView, event: &StateEvent) {
        self(state, event)
    }
}

/// Subscribers of one connection, notified in subscription order.
#[derive(Default)]
pub struct Listeners(Vec<Box<dyn StateListener>>);

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn StateListener>) {
        self.0.push(listener);
    }

    pub fn notify(&mut self, state: &dyn StateView, event: &StateEvent) {
        trace!(event = event.name(), "notify");
        for listener in self.0.iter_mut() {
            listener.on_event(state, event);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
