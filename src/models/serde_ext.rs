use serde::{Deserialize, Deserializer, Serializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = ...)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// 64-bit sizes are sent as decimal strings so JavaScript clients keep full
/// precision.
pub fn i64_as_string<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[derive(Serialize)]
    struct Sized {
        #[serde(serialize_with = "i64_as_string")]
        size: i64,
    }

    #[test]
    fn test_double_option() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);

        let null: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: Patch = serde_json::from_str(r#"{"description": "intro"}"#).unwrap();
        assert_eq!(set.description, Some(Some("intro".to_string())));
    }

    #[test]
    fn test_i64_as_string() {
        let json = serde_json::to_value(Sized { size: 9_007_199_254_740_993 }).unwrap();
        assert_eq!(json["size"], "9007199254740993");
    }
}
