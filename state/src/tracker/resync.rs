use std::time::Duration;

use tracing::{debug, info};

use crate::packet::{Request, TinyKind};

use super::events::StateEvent;
use super::hooks::HookContext;

/// Minimum time between two full state requests.
pub const DEFAULT_RESYNC_WINDOW: Duration = Duration::from_millis(10_000);

/// Request id used for the probes; the host only replies to nonzero ids.
pub const RESYNC_REQI: u8 = 1;

/// Session info, connection list, player list and game state, in that order.
pub const RESYNC_PROBES: [TinyKind; 4] = [TinyKind::Ism, TinyKind::Ncn, TinyKind::Npl, TinyKind::Sst];

pub(crate) fn on_desync(ctx: &mut HookContext<'_>, _event: &StateEvent) {
    request_full_state(ctx);
}

/// Ask the host to announce everything again, unless we already asked
/// within the resync window. Returns whether the probes went out.
pub fn request_full_state(ctx: &mut HookContext<'_>) -> bool {
    let now = ctx.now();
    if let Some(last) = ctx.state.last_oos {
        let elapsed = now.saturating_duration_since(last);
        if elapsed < ctx.resync_window() {
            debug!(?elapsed, "resync already requested recently, dropping");
            return false;
        }
    }

    info!("state out of sync, requesting full state");
    for kind in RESYNC_PROBES {
        ctx.send(Request::tiny(RESYNC_REQI, kind));
    }
    ctx.state.last_oos = Some(now);
    true
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::tracker::client_state::ClientState;

    fn trigger(state: &mut ClientState, now: Instant) -> (bool, Vec<Request>) {
        let mut ctx = HookContext::new(state, now, DEFAULT_RESYNC_WINDOW);
        let ran = request_full_state(&mut ctx);
        let (events, requests) = ctx.into_effects();
        assert!(events.is_empty());
        (ran, requests)
    }

    #[test]
    fn debounces_within_window() {
        let mut state = ClientState::new();
        let t0 = Instant::now();

        let (ran, requests) = trigger(&mut state, t0);
        assert!(ran);
        assert_eq!(
            requests,
            RESYNC_PROBES.map(|kind| Request::tiny(RESYNC_REQI, kind))
        );
        assert_eq!(state.last_oos(), Some(t0));

        let (ran, requests) = trigger(&mut state, t0 + Duration::from_millis(5_000));
        assert!(!ran);
        assert!(requests.is_empty());
        assert_eq!(state.last_oos(), Some(t0));

        let t2 = t0 + Duration::from_millis(11_000);
        let (ran, requests) = trigger(&mut state, t2);
        assert!(ran);
        assert_eq!(requests.len(), 4);
        assert_eq!(state.last_oos(), Some(t2));
    }

    #[test]
    fn window_is_measured_from_last_successful_run() {
        let mut state = ClientState::new();
        let t0 = Instant::now();
        trigger(&mut state, t0);
        trigger(&mut state, t0 + Duration::from_millis(9_000));
        // Suppressed attempts do not push the window out.
        let (ran, _) = trigger(&mut state, t0 + Duration::from_millis(10_000));
        assert!(ran);
    }
}
