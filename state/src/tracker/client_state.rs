use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;

use crate::fields::{UpdateFromPacket, field_schema};
use crate::packet::FieldValue;
use crate::types::{Plid, Ucid};

use super::state::{ConnectionState, PlayerState};

/// Everything known about the host session of one connection.
///
/// Created when the connection becomes ready and dropped when it is lost.
/// Only the packet handlers mutate it; everyone else reads through
/// [`StateView`](super::listener::StateView).
#[derive(Debug, Default, Serialize)]
pub struct ClientState {
    // Version announcement
    pub(crate) version: String,
    pub(crate) product: String,
    pub(crate) insim_version: u8,

    // Session init
    pub(crate) host: bool,
    pub(crate) hname: String,

    // Game state snapshot
    pub(crate) replay_speed: f32,
    pub(crate) state_flags: u16,
    pub(crate) ingame_cam: u8,
    pub(crate) view_plid: u8,
    pub(crate) nump: u8,
    pub(crate) num_conns: u8,
    pub(crate) num_finished: u8,
    pub(crate) race_in_prog: u8,
    pub(crate) qual_mins: u8,
    pub(crate) race_laps: u8,
    pub(crate) track: String,
    pub(crate) weather: u8,
    pub(crate) wind: u8,

    // Race start
    pub(crate) timing: u8,
    pub(crate) split1: u16,
    pub(crate) split2: u16,
    pub(crate) split3: u16,
    pub(crate) finish: u16,
    pub(crate) num_nodes: u16,

    // Autocross
    pub(crate) ax_start: u8,
    pub(crate) num_cp: u8,
    pub(crate) num_o: u16,
    pub(crate) lname: String,

    pub(crate) connections: HashMap<Ucid, ConnectionState>,
    pub(crate) players: HashMap<Plid, PlayerState>,

    /// When the last full state request went out.
    #[serde(skip)]
    pub(crate) last_oos: Option<Instant>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_by_plid(&self, plid: Plid) -> Option<&PlayerState> {
        self.players.get(&plid)
    }

    /// The active player of connection `ucid`.
    pub fn player_by_ucid(&self, ucid: Ucid) -> Option<&PlayerState> {
        self.connection_by_ucid(ucid)
            .and_then(ConnectionState::plid)
            .and_then(|plid| self.player_by_plid(plid))
    }

    pub fn connection_by_ucid(&self, ucid: Ucid) -> Option<&ConnectionState> {
        self.connections.get(&ucid)
    }

    /// The connection owning player `plid`.
    pub fn connection_by_plid(&self, plid: Plid) -> Option<&ConnectionState> {
        self.player_by_plid(plid)
            .and_then(|player| self.connection_by_ucid(player.ucid))
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionState> {
        self.connections.values()
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn version(&self) -> &str {
        self.version.as_ref()
    }

    pub fn product(&self) -> &str {
        self.product.as_ref()
    }

    pub fn insim_version(&self) -> u8 {
        self.insim_version
    }

    pub fn host(&self) -> bool {
        self.host
    }

    pub fn hname(&self) -> &str {
        self.hname.as_ref()
    }

    pub fn track(&self) -> &str {
        self.track.as_ref()
    }

    pub fn weather(&self) -> u8 {
        self.weather
    }

    pub fn wind(&self) -> u8 {
        self.wind
    }

    pub fn race_laps(&self) -> u8 {
        self.race_laps
    }

    pub fn qual_mins(&self) -> u8 {
        self.qual_mins
    }

    /// 0 = no race, 1 = racing, 2 = qualifying
    pub fn race_in_prog(&self) -> u8 {
        self.race_in_prog
    }

    pub fn last_oos(&self) -> Option<Instant> {
        self.last_oos
    }
}

impl UpdateFromPacket for ClientState {
    fn update_field(&mut self, name: &str, value: &FieldValue) -> bool {
        field_schema!(self, name, value, {
            "replayspeed" => replay_speed,
            "flags" => state_flags,
            "ingamecam" => ingame_cam,
            "viewplid" => view_plid,
            "nump" => nump,
            "numconns" => num_conns,
            "numfinished" => num_finished,
            "raceinprog" => race_in_prog,
            "qualmins" => qual_mins,
            "racelaps" => race_laps,
            "track" => track,
            "weather" => weather,
            "wind" => wind,
            "timing" => timing,
            "split1" => split1,
            "split2" => split2,
            "split3" => split3,
            "finish" => finish,
            "numnodes" => num_nodes,
            "axstart" => ax_start,
            "numcp" => num_cp,
            "numo" => num_o,
            "lname" => lname,
        })
    }
}
