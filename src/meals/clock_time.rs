//! `HH:MM:SS` wall-clock times; `HH:MM` is accepted on input.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use time::{format_description::FormatItem, macros::format_description, Time};

const WITH_SECONDS: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const WITHOUT_SECONDS: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

pub fn parse(raw: &str) -> Result<Time, time::error::Parse> {
    Time::parse(raw, WITH_SECONDS).or_else(|_| Time::parse(raw, WITHOUT_SECONDS))
}

pub fn serialize<S: Serializer>(t: &Time, s: S) -> Result<S::Ok, S::Error> {
    let text = t.format(WITH_SECONDS).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Time, D::Error> {
    let raw = String::deserialize(d)?;
    parse(&raw).map_err(D::Error::custom)
}

pub mod option {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(t: &Option<Time>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => super::serialize(t, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Time>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}

/// Absent, `null` and a value stay distinct, for partial updates.
pub fn patch<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<Time>>, D::Error> {
    option::deserialize(d).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn accepts_with_and_without_seconds() {
        assert_eq!(parse("07:30:15").unwrap(), time!(07:30:15));
        assert_eq!(parse("07:30").unwrap(), time!(07:30));
        assert!(parse("7 am").is_err());
    }

    #[test]
    fn serializes_with_seconds() {
        #[derive(serde::Serialize)]
        struct Probe {
            #[serde(with = "super::option")]
            at: Option<Time>,
        }
        let json = serde_json::to_string(&Probe {
            at: Some(time!(18:05)),
        })
        .unwrap();
        assert_eq!(json, r#"{"at":"18:05:00"}"#);
    }
}
