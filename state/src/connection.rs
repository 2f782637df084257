use std::collections::VecDeque;
use std::time::Instant;

use kinded::Kinded;
use tracing::{Level, debug, span, trace, warn};

use crate::ErrorKind;
use crate::config::TrackerConfig;
use crate::packet::{Packet, Request};
use crate::tracker::{
    ClientState, Hook, HookContext, HookKey, HookRegistry, Listeners, StateEvent, StateListener,
    StateTracker,
};

/// Outbound side of the link to the host. Encoding and framing are the
/// implementor's business.
pub trait Transport {
    fn send(&mut self, request: &Request) -> Result<(), ErrorKind>;
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One link to a host, with the hooks bound to it and the session state
/// tracked for it.
///
/// Packets are handled strictly one at a time: a packet's hooks, and any
/// hooks triggered by the events they emit, run to completion before
/// [`handle_packet`](Self::handle_packet) returns.
pub struct Connection<T, C = SystemClock> {
    transport: T,
    clock: C,
    config: TrackerConfig,
    hooks: HookRegistry,
    listeners: Listeners,
    tracker: StateTracker,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T, config: TrackerConfig) -> Self {
        Self::with_clock(transport, SystemClock, config)
    }
}

impl<T: Transport, C: Clock> Connection<T, C> {
    pub fn with_clock(transport: T, clock: C, config: TrackerConfig) -> Self {
        Self {
            transport,
            clock,
            config,
            hooks: HookRegistry::new(),
            listeners: Listeners::new(),
            tracker: StateTracker::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn StateListener>) {
        self.listeners.subscribe(listener);
    }

    /// The host accepted us; start tracking.
    pub fn connected(&mut self) {
        self.tracker.on_ready(&mut self.hooks, &mut self.listeners);
    }

    /// The link is gone; stop tracking and forget everything.
    pub fn disconnected(&mut self) {
        self.tracker.on_lost(&mut self.hooks, &mut self.listeners);
    }

    /// Current session mirror, `None` while not connected.
    pub fn state(&self) -> Option<&ClientState> {
        self.tracker.state()
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn handle_packet(&mut self, packet: &Packet) {
        let kind = packet.kind();
        let span = span!(Level::TRACE, "packet dispatch", ?kind);
        let _enter = span.enter();

        let hooks = self.hooks.hooks_for(HookKey::Packet(kind));
        if hooks.is_empty() {
            if self.config.log_unhandled_packets {
                debug!(?kind, "no hook bound");
            } else {
                trace!(?kind, "no hook bound");
            }
            return;
        }

        let now = self.clock.now();
        let window = self.config.resync_window();
        let Some(state) = self.tracker.state_mut() else {
            trace!(?kind, "hook bound but no state tracked");
            return;
        };

        let mut ctx = HookContext::new(state, now, window);
        for hook in hooks {
            match hook {
                Hook::Packet(run) => run(&mut ctx, packet),
                Hook::Event(_) => {}
            }
        }
        let (events, requests) = ctx.into_effects();

        self.flush(requests);
        self.deliver(events);
    }

    /// Report that something outside the handlers noticed the mirror is
    /// wrong. Goes through the same debounced recovery as a handler desync.
    pub fn report_desync(&mut self) {
        if !self.tracker.is_ready() {
            trace!("desync reported while not tracking");
            return;
        }
        self.deliver(vec![StateEvent::Desync]);
    }

    /// Hooks bound to each event run first, then the listeners hear about
    /// it. Events raised along the way are queued behind the current ones.
    fn deliver(&mut self, events: Vec<StateEvent>) {
        let mut pending: VecDeque<StateEvent> = events.into();
        while let Some(event) = pending.pop_front() {
            let hooks = self.hooks.hooks_for(HookKey::Event(event.kind()));
            if !hooks.is_empty() {
                let now = self.clock.now();
                let window = self.config.resync_window();
                if let Some(state) = self.tracker.state_mut() {
                    let mut ctx = HookContext::new(state, now, window);
                    for hook in hooks {
                        match hook {
                            Hook::Event(run) => run(&mut ctx, &event),
                            Hook::Packet(_) => {}
                        }
                    }
                    let (raised, requests) = ctx.into_effects();
                    self.flush(requests);
                    pending.extend(raised);
                }
            }

            if let Some(state) = self.tracker.state() {
                self.listeners.notify(state, &event);
            }
        }
    }

    fn flush(&mut self, requests: Vec<Request>) {
        for request in requests {
            if let Err(err) = self.transport.send(&request) {
                warn!(%err, ?request, "failed to send request");
            }
        }
    }
}
