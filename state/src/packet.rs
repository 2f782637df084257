use kinded::Kinded;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use variantly::Variantly;

use crate::types::{Plid, Ucid};

/// A single decoded field value.
///
/// The decoder only hands out data here, so there is nothing callable to
/// filter; values whose type does not fit the target field are skipped
/// by the schema instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Variantly)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Flag(v)
    }
}

macro_rules! int_field_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::Int(i64::from(v))
                }
            }
        )+
    };
}

int_field_value!(u8, u16, u32, i16, i32, i64);

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(f64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// Named values of a decoded packet, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(Vec<(String, FieldValue)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0.push((name.to_string(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One car record inside a multi-car info batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarInfo {
    pub plid: Plid,
    /// node, lap, position, info, x, y, z, speed, direction, heading, angvel
    #[serde(default)]
    pub fields: Fields,
}

/// A packet as produced by the decoder.
///
/// Identity keys (`ucid`, `plid`, ownership pairs) are typed; everything
/// else travels in `fields` and is copied through each entity's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Kinded)]
#[kinded(derive(Hash))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Packet {
    /// Host version announcement.
    Version {
        version: String,
        product: String,
        insim_version: u8,
    },
    /// Reply to the session init/join; tells whether we are on a host.
    SessionInit { host: bool, hname: String },
    /// Game state snapshot.
    State {
        #[serde(default)]
        fields: Fields,
    },
    /// Autocross layout info.
    AutocrossInfo {
        #[serde(default)]
        fields: Fields,
    },
    /// Race (re)start.
    RaceStart {
        #[serde(default)]
        fields: Fields,
    },
    NewConnection {
        ucid: Ucid,
        #[serde(default)]
        fields: Fields,
    },
    ConnectionLeave {
        ucid: Ucid,
        #[serde(default)]
        reason: u8,
    },
    ConnectionRename {
        ucid: Ucid,
        #[serde(default)]
        fields: Fields,
    },
    /// A player joined the race or left the pits.
    NewPlayer {
        plid: Plid,
        ucid: Ucid,
        #[serde(default)]
        fields: Fields,
    },
    /// Player teleported straight to the pit garage.
    TelePits { plid: Plid },
    PlayerLeave { plid: Plid },
    /// Car ownership moved between connections.
    TakeOver {
        plid: Plid,
        old_ucid: Ucid,
        new_ucid: Ucid,
    },
    /// Provisional finish notification.
    Finish {
        plid: Plid,
        #[serde(default)]
        fields: Fields,
    },
    Lap {
        plid: Plid,
        #[serde(default)]
        fields: Fields,
    },
    Split {
        plid: Plid,
        #[serde(default)]
        fields: Fields,
    },
    /// Confirmed race or qualifying result.
    RaceResult {
        plid: Plid,
        #[serde(default)]
        fields: Fields,
    },
    MultiCarInfo { cars: Vec<CarInfo> },
    Tiny { reqi: u8, kind: TinyKind },
    Message {
        ucid: Ucid,
        plid: Plid,
        text: String,
    },
}

/// Subtypes of the small general purpose request packet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TinyKind {
    Ver,
    Close,
    Ping,
    Reply,
    /// Ask for the session info (host flag and name).
    Ism,
    /// Ask for every connection to be re-announced.
    Ncn,
    /// Ask for every player to be re-announced.
    Npl,
    /// Ask for the game state snapshot.
    Sst,
    Res,
    Axi,
}

/// Outbound packets this crate originates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Tiny { reqi: u8, kind: TinyKind },
}

impl Request {
    pub fn tiny(reqi: u8, kind: TinyKind) -> Self {
        Request::Tiny { reqi, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_kind_matches_variant() {
        let packet = Packet::TelePits { plid: Plid(4) };
        assert_eq!(packet.kind(), PacketKind::TelePits);
    }

    #[test]
    fn packet_log_line_deserializes() {
        let line = r#"{"type":"new_player","plid":3,"ucid":1,"fields":[["pname","Bob"],["cname","XRT"],["h_mass",20]]}"#;
        let packet: Packet = serde_json::from_str(line).unwrap();
        match packet {
            Packet::NewPlayer { plid, ucid, fields } => {
                assert_eq!(plid, Plid(3));
                assert_eq!(ucid, Ucid(1));
                assert_eq!(fields.get("pname"), Some(&FieldValue::Text("Bob".into())));
                assert_eq!(fields.get("h_mass"), Some(&FieldValue::Int(20)));
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn tiny_kind_names() {
        assert_eq!(TinyKind::Ncn.to_string(), "NCN");
        assert_eq!("SST".parse::<TinyKind>().unwrap(), TinyKind::Sst);
    }

    #[test]
    fn fields_keep_wire_order() {
        let fields = Fields::new().with("b", 1).with("a", 2.5).with("c", true);
        let names: Vec<&str> = fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
