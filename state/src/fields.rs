use tracing::trace;

use crate::packet::{FieldValue, Fields};

/// Conversion from a decoded value into a declared entity field type.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! int_from_field_value {
    ($($ty:ty),+) => {
        $(
            impl FromFieldValue for $ty {
                fn from_field_value(value: &FieldValue) -> Option<Self> {
                    value.int_ref().and_then(|v| <$ty>::try_from(*v).ok())
                }
            }
        )+
    };
}

int_from_field_value!(u8, u16, u32, i8, i16, i32, i64);

impl FromFieldValue for f32 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        f64::from_field_value(value).map(|v| v as f32)
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Flag(v) => Some(*v),
            FieldValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.text_ref().cloned()
    }
}

/// Overwrite `slot` with `value` if it converts to the slot's type.
pub(crate) fn assign<T: FromFieldValue>(slot: &mut T, name: &str, value: &FieldValue) -> bool {
    match T::from_field_value(value) {
        Some(v) => {
            *slot = v;
            true
        }
        None => {
            trace!(field = name, ?value, "incompatible field value skipped");
            false
        }
    }
}

/// Entities that can be populated from a decoded packet's fields.
///
/// Only names in the entity's declared schema are written. Anything else
/// the packet carries is dropped.
pub trait UpdateFromPacket {
    /// Apply one named value. Returns whether the field was written.
    fn update_field(&mut self, name: &str, value: &FieldValue) -> bool;

    fn update_from_fields(&mut self, fields: &Fields) -> usize {
        let mut written = 0;
        for (name, value) in fields.iter() {
            if self.update_field(name, value) {
                written += 1;
            } else {
                trace!(field = name, "field not in schema");
            }
        }
        written
    }
}

/// Expands to a `match` over the declared wire names of an entity.
///
/// ```ignore
/// field_schema!(self, name, value, {
///     "pname" => pname,
///     "admin" => admin,
/// })
/// ```
macro_rules! field_schema {
    ($target:expr, $name:expr, $value:expr, { $($key:literal => $field:ident),+ $(,)? }) => {
        match $name {
            $( $key => $crate::fields::assign(&mut $target.$field, $key, $value), )+
            _ => false,
        }
    };
}

pub(crate) use field_schema;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        name: String,
        laps: u16,
        speed: f32,
        admin: bool,
    }

    impl UpdateFromPacket for Probe {
        fn update_field(&mut self, name: &str, value: &FieldValue) -> bool {
            field_schema!(self, name, value, {
                "name" => name,
                "laps" => laps,
                "speed" => speed,
                "admin" => admin,
            })
        }
    }

    #[test]
    fn known_fields_are_overwritten() {
        let mut probe = Probe::default();
        let fields = Fields::new()
            .with("name", "Alice")
            .with("laps", 12)
            .with("speed", 41.5)
            .with("admin", 1);
        assert_eq!(probe.update_from_fields(&fields), 4);
        assert_eq!(probe.name, "Alice");
        assert_eq!(probe.laps, 12);
        assert_eq!(probe.speed, 41.5);
        assert!(probe.admin);
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let mut probe = Probe::default();
        let fields = Fields::new().with("colour", "red").with("laps", 3);
        assert_eq!(probe.update_from_fields(&fields), 1);
        assert_eq!(probe.laps, 3);
    }

    #[test]
    fn mistyped_values_leave_field_untouched() {
        let mut probe = Probe {
            laps: 7,
            ..Default::default()
        };
        let fields = Fields::new().with("laps", "seven").with("laps", 70_000);
        assert_eq!(probe.update_from_fields(&fields), 0);
        assert_eq!(probe.laps, 7);
    }
}
