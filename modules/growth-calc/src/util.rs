//! Small shared helpers.

/// Serde representation for `f64` values that may be non-finite.
///
/// JSON has no literal for IEEE-754 infinity, and `serde_json` flattens
/// non-finite numbers to `null`. Exponential results can legitimately
/// overflow to infinity, so non-finite values are carried as the string
/// tokens `"Infinity"`, `"-Infinity"` and `"NaN"` instead, and parsed
/// back on deserialization.
pub(crate) mod float_token {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(token(*value))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Finite(f64),
            Token(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Finite(v) => Ok(v),
            Repr::Token(t) => match t.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid float token: {other}"))),
            },
        }
    }

    /// JSON value for a possibly non-finite float, using the same tokens.
    pub fn to_json(value: f64) -> serde_json::Value {
        serde_json::Number::from_f64(value).map_or_else(
            || serde_json::Value::String(token(value).to_owned()),
            serde_json::Value::Number,
        )
    }

    fn token(value: f64) -> &'static str {
        if value.is_nan() {
            "NaN"
        } else if value > 0.0 {
            "Infinity"
        } else {
            "-Infinity"
        }
    }

    #[cfg(test)]
    #[allow(clippy::float_cmp, clippy::unwrap_used)]
    mod tests {
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "super")]
            value: f64,
        }

        fn round_trip(value: f64) -> (String, f64) {
            let json = serde_json::to_string(&Wrapper { value }).unwrap();
            let back: Wrapper = serde_json::from_str(&json).unwrap();
            (json, back.value)
        }

        #[test]
        fn finite_values_stay_numbers() {
            let (json, back) = round_trip(1e100);
            assert_eq!(json, r#"{"value":1e100}"#);
            assert_eq!(back, 1e100);
        }

        #[test]
        fn infinity_round_trips_as_token() {
            let (json, back) = round_trip(f64::INFINITY);
            assert_eq!(json, r#"{"value":"Infinity"}"#);
            assert_eq!(back, f64::INFINITY);

            let (json, back) = round_trip(f64::NEG_INFINITY);
            assert_eq!(json, r#"{"value":"-Infinity"}"#);
            assert_eq!(back, f64::NEG_INFINITY);
        }

        #[test]
        fn nan_round_trips_as_token() {
            let (json, back) = round_trip(f64::NAN);
            assert_eq!(json, r#"{"value":"NaN"}"#);
            assert!(back.is_nan());
        }

        #[test]
        fn to_json_uses_tokens_for_non_finite() {
            assert_eq!(super::to_json(6.0), serde_json::json!(6.0));
            assert_eq!(super::to_json(f64::INFINITY), serde_json::json!("Infinity"));
        }

        #[test]
        fn rejects_unknown_tokens() {
            let result: Result<Wrapper, _> = serde_json::from_str(r#"{"value":"huge"}"#);
            assert!(result.is_err());
        }
    }
}
