use std::time::{Duration, Instant};

use crate::packet::{Packet, PacketKind, Request};

use super::client_state::ClientState;
use super::events::{StateEvent, StateEventKind};
use super::{handlers, resync};

/// What a hook is bound to: a wire packet kind or one of our own events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKey {
    Packet(PacketKind),
    Event(StateEventKind),
}

pub type PacketHook = fn(&mut HookContext<'_>, &Packet);
pub type EventHook = fn(&mut HookContext<'_>, &StateEvent);

#[derive(Clone, Copy)]
pub enum Hook {
    Packet(PacketHook),
    Event(EventHook),
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hook::Packet(_) => f.write_str("Hook::Packet"),
            Hook::Event(_) => f.write_str("Hook::Event"),
        }
    }
}

/// Every hook the state tracker attaches to a connection.
pub static STATE_HOOKS: &[(HookKey, Hook)] = &[
    (HookKey::Packet(PacketKind::Version), Hook::Packet(handlers::on_version)),
    (HookKey::Packet(PacketKind::SessionInit), Hook::Packet(handlers::on_session_init)),
    (HookKey::Packet(PacketKind::State), Hook::Packet(handlers::on_session_fields)),
    (HookKey::Packet(PacketKind::AutocrossInfo), Hook::Packet(handlers::on_session_fields)),
    (HookKey::Packet(PacketKind::RaceStart), Hook::Packet(handlers::on_race_start)),
    (HookKey::Packet(PacketKind::NewConnection), Hook::Packet(handlers::on_new_connection)),
    (HookKey::Packet(PacketKind::ConnectionLeave), Hook::Packet(handlers::on_connection_leave)),
    (HookKey::Packet(PacketKind::ConnectionRename), Hook::Packet(handlers::on_connection_rename)),
    (HookKey::Packet(PacketKind::NewPlayer), Hook::Packet(handlers::on_new_player)),
    (HookKey::Packet(PacketKind::TelePits), Hook::Packet(handlers::on_tele_pits)),
    (HookKey::Packet(PacketKind::PlayerLeave), Hook::Packet(handlers::on_player_leave)),
    (HookKey::Packet(PacketKind::TakeOver), Hook::Packet(handlers::on_take_over)),
    (HookKey::Packet(PacketKind::Finish), Hook::Packet(handlers::on_finish)),
    (HookKey::Packet(PacketKind::Lap), Hook::Packet(handlers::on_lap_or_split)),
    (HookKey::Packet(PacketKind::Split), Hook::Packet(handlers::on_lap_or_split)),
    (HookKey::Packet(PacketKind::RaceResult), Hook::Packet(handlers::on_race_result)),
    (HookKey::Packet(PacketKind::MultiCarInfo), Hook::Packet(handlers::on_multi_car_info)),
    (HookKey::Event(StateEventKind::Desync), Hook::Event(resync::on_desync)),
];

/// Handle returned by [`HookRegistry::register`], needed to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// The hooks currently bound to one connection, in registration order.
#[derive(Debug, Default)]
pub struct HookRegistry {
    next_id: u64,
    hooks: Vec<(HookId, HookKey, Hook)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: HookKey, hook: Hook) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push((id, key, hook));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unregister(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hook_id, _, _)| *hook_id != id);
        self.hooks.len() != before
    }

    /// Snapshot of the hooks bound to `key`, so they can run while the
    /// registry is borrowed elsewhere.
    pub fn hooks_for(&self, key: HookKey) -> Vec<Hook> {
        self.hooks
            .iter()
            .filter(|(_, hook_key, _)| *hook_key == key)
            .map(|(_, _, hook)| *hook)
            .collect()
    }

    pub fn is_bound(&self, key: HookKey) -> bool {
        self.hooks.iter().any(|(_, hook_key, _)| *hook_key == key)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Handle passed to every hook: the store of the connection the hook is
/// bound to, plus buffers for what the hook wants to emit or send.
pub struct HookContext<'a> {
    pub(crate) state: &'a mut ClientState,
    now: Instant,
    resync_window: Duration,
    events: Vec<StateEvent>,
    requests: Vec<Request>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(state: &'a mut ClientState, now: Instant, resync_window: Duration) -> Self {
        Self {
            state,
            now,
            resync_window,
            events: Vec::new(),
            requests: Vec::new(),
        }
    }

    pub fn state(&self) -> &ClientState {
        self.state
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn resync_window(&self) -> Duration {
        self.resync_window
    }

    pub fn emit(&mut self, event: StateEvent) {
        self.events.push(event);
    }

    pub fn send(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub(crate) fn into_effects(self) -> (Vec<StateEvent>, Vec<Request>) {
        (self.events, self.requests)
    }
}
