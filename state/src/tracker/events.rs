use kinded::Kinded;
use serde::Serialize;
use strum_macros::IntoStaticStr;

use crate::types::{Plid, Ucid};

/// Notifications emitted while the mirror of the host's state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Kinded, IntoStaticStr)]
#[kinded(derive(Hash))]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StateEvent {
    ConnectionNew(Ucid),
    ConnectionLeave(Ucid),
    ConnectionRename(Ucid),
    PlayerNew(Plid),
    PlayerLeave(Plid),
    PlayerSwap(Plid),
    /// Players whose fields changed, in the order they were applied.
    PlayerUpdate(Vec<Plid>),
    /// The local mirror disagrees with what the host just told us.
    #[strum(serialize = "desync-signal")]
    #[serde(rename = "desync-signal")]
    Desync,
    StateReady,
    StateNotReady,
}

impl StateEvent {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
