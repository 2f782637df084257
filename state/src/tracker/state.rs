use serde::Serialize;

use crate::fields::{UpdateFromPacket, field_schema};
use crate::packet::FieldValue;
use crate::types::{Plid, Ucid};

/// A client connected to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionState {
    pub(crate) ucid: Ucid,
    /// Account name
    pub(crate) uname: String,
    /// Display name, may contain colour codes
    pub(crate) pname: String,
    /// Number plate of the car this connection drives
    pub(crate) plate: String,
    pub(crate) admin: bool,
    pub(crate) flags: u8,
    /// Number of connections the host reported alongside this one
    pub(crate) total: u8,
    /// Active player of this connection, `Plid::NONE` if spectating
    pub(crate) plid: Plid,
}

impl ConnectionState {
    pub(crate) fn new(ucid: Ucid) -> Self {
        Self {
            ucid,
            ..Default::default()
        }
    }

    pub fn ucid(&self) -> Ucid {
        self.ucid
    }

    pub fn uname(&self) -> &str {
        self.uname.as_ref()
    }

    pub fn pname(&self) -> &str {
        self.pname.as_ref()
    }

    pub fn plate(&self) -> &str {
        self.plate.as_ref()
    }

    pub fn admin(&self) -> bool {
        self.admin
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    /// The player this connection is driving, if any.
    pub fn plid(&self) -> Option<Plid> {
        self.plid.active()
    }
}

impl UpdateFromPacket for ConnectionState {
    fn update_field(&mut self, name: &str, value: &FieldValue) -> bool {
        field_schema!(self, name, value, {
            "uname" => uname,
            "pname" => pname,
            "plate" => plate,
            "admin" => admin,
            "flags" => flags,
            "total" => total,
        })
    }
}

/// A car on track (or in the pits) and the connection driving it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerState {
    pub(crate) plid: Plid,
    pub(crate) ucid: Ucid,

    // Identity, from the new player announcement
    pub(crate) ptype: u8,
    pub(crate) flags: u16,
    pub(crate) pname: String,
    pub(crate) plate: String,
    pub(crate) cname: String,
    pub(crate) sname: String,
    pub(crate) tyres: u32,
    pub(crate) h_mass: u8,
    pub(crate) h_tres: u8,
    pub(crate) model: u8,
    pub(crate) pass: u8,
    pub(crate) setf: u8,
    pub(crate) fuel: u8,

    // Live telemetry, from multi-car info
    pub(crate) node: u16,
    pub(crate) lap: u16,
    pub(crate) position: u8,
    pub(crate) info: u8,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) z: i32,
    pub(crate) speed: u16,
    pub(crate) direction: u16,
    pub(crate) heading: u16,
    pub(crate) angvel: i16,

    // Lap and split timing
    pub(crate) ltime: u32,
    pub(crate) etime: u32,
    pub(crate) stime: u32,
    pub(crate) split: u8,
    pub(crate) penalty: u8,
    pub(crate) fuel200: u8,

    // Result
    pub(crate) ttime: u32,
    pub(crate) btime: u32,
    pub(crate) numstops: u8,
    pub(crate) confirm: u8,
    pub(crate) lapsdone: u16,
    pub(crate) resultnum: u8,
    pub(crate) numres: u8,
    pub(crate) pseconds: u16,

    /// Set by a tele-pit, cleared when the player rejoins.
    pub(crate) pitting: bool,
    /// `true` once the host confirmed the result, `false` for a provisional finish.
    pub(crate) finalresult: bool,
}

impl PlayerState {
    pub(crate) fn new(plid: Plid, ucid: Ucid) -> Self {
        Self {
            plid,
            ucid,
            ..Default::default()
        }
    }

    /// Forget everything the last race left in the result fields.
    pub(crate) fn clear_result(&mut self) {
        self.ttime = 0;
        self.btime = 0;
        self.numstops = 0;
        self.confirm = 0;
        self.lapsdone = 0;
        self.resultnum = 0;
        self.numres = 0;
        self.pseconds = 0;
        self.finalresult = false;
    }

    pub fn plid(&self) -> Plid {
        self.plid
    }

    pub fn ucid(&self) -> Ucid {
        self.ucid
    }

    pub fn ptype(&self) -> u8 {
        self.ptype
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn pname(&self) -> &str {
        self.pname.as_ref()
    }

    pub fn plate(&self) -> &str {
        self.plate.as_ref()
    }

    /// Short car name, e.g. `XRT`
    pub fn cname(&self) -> &str {
        self.cname.as_ref()
    }

    pub fn sname(&self) -> &str {
        self.sname.as_ref()
    }

    pub fn tyres(&self) -> u32 {
        self.tyres
    }

    pub fn h_mass(&self) -> u8 {
        self.h_mass
    }

    pub fn h_tres(&self) -> u8 {
        self.h_tres
    }

    pub fn node(&self) -> u16 {
        self.node
    }

    pub fn lap(&self) -> u16 {
        self.lap
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn coordinates(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn direction(&self) -> u16 {
        self.direction
    }

    pub fn heading(&self) -> u16 {
        self.heading
    }

    pub fn angvel(&self) -> i16 {
        self.angvel
    }

    pub fn ltime(&self) -> u32 {
        self.ltime
    }

    pub fn etime(&self) -> u32 {
        self.etime
    }

    pub fn stime(&self) -> u32 {
        self.stime
    }

    pub fn split(&self) -> u8 {
        self.split
    }

    pub fn penalty(&self) -> u8 {
        self.penalty
    }

    pub fn ttime(&self) -> u32 {
        self.ttime
    }

    pub fn btime(&self) -> u32 {
        self.btime
    }

    pub fn numstops(&self) -> u8 {
        self.numstops
    }

    pub fn lapsdone(&self) -> u16 {
        self.lapsdone
    }

    pub fn resultnum(&self) -> u8 {
        self.resultnum
    }

    pub fn pitting(&self) -> bool {
        self.pitting
    }

    pub fn finalresult(&self) -> bool {
        self.finalresult
    }
}

impl UpdateFromPacket for PlayerState {
    fn update_field(&mut self, name: &str, value: &FieldValue) -> bool {
        field_schema!(self, name, value, {
            "ptype" => ptype,
            "flags" => flags,
            "pname" => pname,
            "plate" => plate,
            "cname" => cname,
            "sname" => sname,
            "tyres" => tyres,
            "h_mass" => h_mass,
            "h_tres" => h_tres,
            "model" => model,
            "pass" => pass,
            "setf" => setf,
            "fuel" => fuel,
            "node" => node,
            "lap" => lap,
            "position" => position,
            "info" => info,
            "x" => x,
            "y" => y,
            "z" => z,
            "speed" => speed,
            "direction" => direction,
            "heading" => heading,
            "angvel" => angvel,
            "ltime" => ltime,
            "etime" => etime,
            "stime" => stime,
            "split" => split,
            "penalty" => penalty,
            "fuel200" => fuel200,
            "ttime" => ttime,
            "btime" => btime,
            "numstops" => numstops,
            "confirm" => confirm,
            "lapsdone" => lapsdone,
            "resultnum" => resultnum,
            "numres" => numres,
            "pseconds" => pseconds,
        })
    }
}
