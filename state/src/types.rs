use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection identifier assigned by the host. `Ucid(0)` is the host itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ucid(pub u8);

impl Ucid {
    pub fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Ucid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Ucid {
    fn from(v: u8) -> Self {
        Ucid(v)
    }
}

/// Player identifier assigned by the host.
///
/// `Plid(0)` never names a player; connections use it to mean "no active player".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plid(pub u8);

impl Plid {
    pub const NONE: Plid = Plid(0);

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// `Some(self)` unless this is the "no player" sentinel.
    pub fn active(self) -> Option<Plid> {
        if self.is_none() { None } else { Some(self) }
    }
}

impl fmt::Display for Plid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Plid {
    fn from(v: u8) -> Self {
        Plid(v)
    }
}
