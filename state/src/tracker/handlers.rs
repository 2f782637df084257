//! One handler per packet kind in [`STATE_HOOKS`](super::hooks::STATE_HOOKS).
//!
//! Each handler checks the cross references it relies on before touching
//! the store. When the host refers to something we do not track, the
//! handler either ignores the packet or emits [`StateEvent::Desync`] and
//! leaves the store untouched.

use tracing::{debug, info, trace, warn};

use crate::fields::UpdateFromPacket;
use crate::packet::Packet;
use crate::types::{Plid, Ucid};

use super::events::StateEvent;
use super::hooks::HookContext;
use super::state::{ConnectionState, PlayerState};

pub(crate) fn on_version(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::Version {
        version,
        product,
        insim_version,
    } = packet
    else {
        return;
    };

    info!(%version, %product, insim_version, "host version");
    ctx.state.version = version.clone();
    ctx.state.product = product.clone();
    ctx.state.insim_version = *insim_version;
}

pub(crate) fn on_session_init(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::SessionInit { host, hname } = packet else {
        return;
    };

    info!(host, %hname, "session init");
    ctx.state.host = *host;
    ctx.state.hname = hname.clone();
}

/// Game state snapshot and autocross info both land on the session itself.
pub(crate) fn on_session_fields(ctx: &mut HookContext<'_>, packet: &Packet) {
    let (Packet::State { fields } | Packet::AutocrossInfo { fields }) = packet else {
        return;
    };

    ctx.state.update_from_fields(fields);
}

pub(crate) fn on_race_start(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::RaceStart { fields } = packet else {
        return;
    };

    ctx.state.update_from_fields(fields);
    for player in ctx.state.players.values_mut() {
        player.clear_result();
    }
    debug!(players = ctx.state.players.len(), "race restart, results cleared");
}

pub(crate) fn on_new_connection(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::NewConnection { ucid, fields } = packet else {
        return;
    };

    let mut connection = ConnectionState::new(*ucid);
    connection.update_from_fields(fields);
    if ctx.state.connections.insert(*ucid, connection).is_some() {
        debug!(%ucid, "connection announced again, replaced");
    }
    ctx.emit(StateEvent::ConnectionNew(*ucid));
}

pub(crate) fn on_connection_leave(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::ConnectionLeave { ucid, reason } = packet else {
        return;
    };

    let Some(connection) = ctx.state.connections.get(ucid) else {
        debug!(%ucid, "untracked connection left");
        return;
    };

    if let Some(plid) = connection.plid() {
        if ctx.state.players.remove(&plid).is_some() {
            trace!(%ucid, %plid, "removed player of leaving connection");
        }
    }
    ctx.state.connections.remove(ucid);
    debug!(%ucid, reason, "connection left");
    ctx.emit(StateEvent::ConnectionLeave(*ucid));
}

pub(crate) fn on_connection_rename(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::ConnectionRename { ucid, fields } = packet else {
        return;
    };

    let Some(connection) = ctx.state.connections.get_mut(ucid) else {
        debug!(%ucid, "rename for untracked connection");
        return;
    };

    connection.update_from_fields(fields);
    // The car being driven carries the same name and plate.
    if let Some(plid) = connection.plid() {
        if let Some(player) = ctx.state.players.get_mut(&plid) {
            for name in ["pname", "plate"] {
                if let Some(value) = fields.get(name) {
                    player.update_field(name, value);
                }
            }
        }
    }
    ctx.emit(StateEvent::ConnectionRename(*ucid));
}

pub(crate) fn on_new_player(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::NewPlayer { plid, ucid, fields } = packet else {
        return;
    };

    // Players coming back out of the pits are announced again under the
    // same plid; those are updates, not joins.
    let previous_owner = match ctx.state.players.get_mut(plid) {
        Some(player) => {
            let previous = player.ucid;
            player.ucid = *ucid;
            player.update_from_fields(fields);
            player.pitting = false;
            Some(previous)
        }
        None => {
            let mut player = PlayerState::new(*plid, *ucid);
            player.update_from_fields(fields);
            ctx.state.players.insert(*plid, player);
            None
        }
    };
    let is_new = previous_owner.is_none();

    if let Some(previous) = previous_owner.filter(|previous| previous != ucid) {
        debug!(%plid, %previous, %ucid, "player announced under a new owner");
        release_player(ctx, previous, *plid);
    }

    if let Some(connection) = ctx.state.connections.get_mut(ucid) {
        connection.plid = *plid;
    } else {
        trace!(%plid, %ucid, "player owner not tracked yet");
    }

    if is_new {
        ctx.emit(StateEvent::PlayerNew(*plid));
    } else {
        ctx.emit(StateEvent::PlayerUpdate(vec![*plid]));
    }
}

pub(crate) fn on_tele_pits(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::TelePits { plid } = packet else {
        return;
    };

    let Some(player) = ctx.state.players.get_mut(plid) else {
        trace!(%plid, "tele-pit for untracked player");
        return;
    };

    player.pitting = true;
    ctx.emit(StateEvent::PlayerUpdate(vec![*plid]));
}

pub(crate) fn on_player_leave(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::PlayerLeave { plid } = packet else {
        return;
    };

    let Some(player) = ctx.state.players.remove(plid) else {
        warn!(%plid, "untracked player left");
        ctx.emit(StateEvent::Desync);
        return;
    };

    if let Some(connection) = ctx.state.connections.get_mut(&player.ucid) {
        connection.plid = Plid::NONE;
    }
    ctx.emit(StateEvent::PlayerLeave(*plid));
}

pub(crate) fn on_take_over(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::TakeOver {
        plid,
        old_ucid,
        new_ucid,
    } = packet
    else {
        return;
    };

    let owner = ctx.state.players.get(plid).map(|player| player.ucid);
    if owner != Some(*old_ucid) {
        warn!(%plid, %old_ucid, current = ?owner, "takeover does not match tracked owner");
        ctx.emit(StateEvent::Desync);
        return;
    }

    if let Some(player) = ctx.state.players.get_mut(plid) {
        player.ucid = *new_ucid;
    }
    release_player(ctx, *old_ucid, *plid);
    if let Some(connection) = ctx.state.connections.get_mut(new_ucid) {
        connection.plid = *plid;
    }
    ctx.emit(StateEvent::PlayerSwap(*plid));
}

/// The previous owner stops driving `plid` once someone else took it.
fn release_player(ctx: &mut HookContext<'_>, ucid: Ucid, plid: Plid) {
    if let Some(connection) = ctx.state.connections.get_mut(&ucid) {
        if connection.plid == plid {
            connection.plid = Plid::NONE;
        }
    }
}

pub(crate) fn on_finish(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::Finish { plid, fields } = packet else {
        return;
    };

    let Some(player) = ctx.state.players.get_mut(plid) else {
        trace!(%plid, "finish for untracked player");
        return;
    };

    player.update_from_fields(fields);
    player.finalresult = false;
    ctx.emit(StateEvent::PlayerUpdate(vec![*plid]));
}

pub(crate) fn on_lap_or_split(ctx: &mut HookContext<'_>, packet: &Packet) {
    let (Packet::Lap { plid, fields } | Packet::Split { plid, fields }) = packet else {
        return;
    };

    let Some(player) = ctx.state.players.get_mut(plid) else {
        warn!(%plid, "timing for untracked player");
        ctx.emit(StateEvent::Desync);
        return;
    };

    player.update_from_fields(fields);
    ctx.emit(StateEvent::PlayerUpdate(vec![*plid]));
}

pub(crate) fn on_race_result(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::RaceResult { plid, fields } = packet else {
        return;
    };

    let Some(player) = ctx.state.players.get_mut(plid) else {
        trace!(%plid, "result for untracked player");
        return;
    };

    player.update_from_fields(fields);
    player.finalresult = true;
    ctx.emit(StateEvent::PlayerUpdate(vec![*plid]));
}

pub(crate) fn on_multi_car_info(ctx: &mut HookContext<'_>, packet: &Packet) {
    let Packet::MultiCarInfo { cars } = packet else {
        return;
    };

    let mut updated = Vec::with_capacity(cars.len());
    for car in cars {
        match ctx.state.players.get_mut(&car.plid) {
            Some(player) => {
                player.update_from_fields(&car.fields);
                updated.push(car.plid);
            }
            None => {
                debug!(plid = %car.plid, "car info for untracked player");
                ctx.emit(StateEvent::Desync);
            }
        }
    }

    ctx.emit(StateEvent::PlayerUpdate(updated));
}
