//! Serde helpers for boolean flags stored as `0`/`1` integers.
//!
//! The on-disk document persists `isDefault` and `isFavorite` as
//! integers. Reading also accepts plain booleans, so documents written
//! by older tooling still load. Use via
//! `#[serde(default, with = "crate::flag")]`.

use serde::{Deserialize, Deserializer, Serializer};

/// Serializes a flag as `0` or `1`.
///
/// # Errors
///
/// Returns an error if the underlying serializer fails.
pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(i64),
    Bool(bool),
}

/// Deserializes a flag from an integer (any non-zero value is true) or
/// a legacy boolean.
///
/// # Errors
///
/// Returns an error when the value is neither a number nor a boolean.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n != 0,
        Raw::Bool(b) => b,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Flagged {
        #[serde(default, with = "crate::flag")]
        active: bool,
    }

    #[test]
    fn serializes_as_integer() {
        let json = serde_json::to_value(&Flagged { active: true }).expect("serialize");
        assert_eq!(json["active"], 1);

        let json = serde_json::to_value(&Flagged { active: false }).expect("serialize");
        assert_eq!(json["active"], 0);
    }

    #[test]
    fn deserializes_integers() {
        let flagged: Flagged = serde_json::from_str(r#"{"active": 1}"#).expect("deserialize");
        assert!(flagged.active);

        let flagged: Flagged = serde_json::from_str(r#"{"active": 0}"#).expect("deserialize");
        assert!(!flagged.active);

        let flagged: Flagged = serde_json::from_str(r#"{"active": 7}"#).expect("deserialize");
        assert!(flagged.active);
    }

    #[test]
    fn accepts_legacy_booleans() {
        let flagged: Flagged = serde_json::from_str(r#"{"active": true}"#).expect("deserialize");
        assert!(flagged.active);

        let flagged: Flagged = serde_json::from_str(r#"{"active": false}"#).expect("deserialize");
        assert!(!flagged.active);
    }

    #[test]
    fn round_trips_through_integer_form() {
        let original = Flagged { active: true };
        let json = serde_json::to_string(&original).expect("serialize");
        assert_eq!(json, r#"{"active":1}"#);

        let back: Flagged = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, original);
    }
}
