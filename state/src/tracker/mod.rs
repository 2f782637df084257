pub mod client_state;
pub mod events;
mod handlers;
pub mod hooks;
pub mod lifecycle;
pub mod listener;
pub mod resync;
pub mod state;

pub use client_state::ClientState;
pub use events::{StateEvent, StateEventKind};
pub use hooks::{Hook, HookContext, HookId, HookKey, HookRegistry, STATE_HOOKS};
pub use lifecycle::StateTracker;
pub use listener::{Listeners, StateListener, StateView};
pub use state::{ConnectionState, PlayerState};
