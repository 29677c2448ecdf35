//! Helpers for partial (`PATCH`) updates.

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "crate::patch::double_option")]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Overwrite `slot` when the patch carries a value.
pub fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        end_date: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"end_date":null}"#).unwrap();
        let value: Probe = serde_json::from_str(r#"{"end_date":"2025-01-01"}"#).unwrap();
        assert_eq!(absent.end_date, None);
        assert_eq!(null.end_date, Some(None));
        assert_eq!(value.end_date, Some(Some("2025-01-01".into())));
    }

    #[test]
    fn set_only_overwrites_present_values() {
        let mut name = String::from("old");
        set(&mut name, None);
        assert_eq!(name, "old");
        set(&mut name, Some("new".into()));
        assert_eq!(name, "new");
    }
}
