//! Common types shared by the relay, the buses and the binaries

/// Wire message and topic naming types
pub mod types {
    use crate::error::Result;
    use serde::{Deserialize, Serialize};

    /// Suffix of the topic carrying unfiltered sensor readings
    pub const RAW_SUFFIX: &str = "raw";

    /// Suffix of the topic carrying smoothed readings
    pub const MEASURED_SUFFIX: &str = "measured";

    /// Single floating point sample, the only wire type on raw and measured topics
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct Float64 {
        pub data: f64,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Message(Float64),
        Bare(f64),
    }

    impl Float64 {
        pub fn new(data: f64) -> Self {
            Float64 { data }
        }

        /// Decode a JSON payload, either `{"data": 1.5}` or a bare number.
        pub fn decode(payload: &str) -> Result<Self> {
            let message = match serde_json::from_str::<Encoded>(payload.trim())? {
                Encoded::Message(message) => message,
                Encoded::Bare(data) => Float64 { data },
            };
            Ok(message)
        }
    }

    impl From<f64> for Float64 {
        fn from(data: f64) -> Self {
            Float64 { data }
        }
    }

    /// Raw and measured topics for one monitored variable
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct ChannelPair {
        pub variable: String,
        pub raw: String,
        pub measured: String,
    }

    impl ChannelPair {
        pub fn for_variable(variable: &str) -> Self {
            ChannelPair {
                variable: variable.to_string(),
                raw: raw_topic(variable),
                measured: measured_topic(variable),
            }
        }
    }

    /// `<variable>/raw`
    pub fn raw_topic(variable: &str) -> String {
        format!("{}/{}", variable, RAW_SUFFIX)
    }

    /// `<variable>/measured`
    pub fn measured_topic(variable: &str) -> String {
        format!("{}/{}", variable, MEASURED_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::types::*;

    #[test]
    fn test_channel_pair_naming() {
        let pair = ChannelPair::for_variable("air_temperature");
        assert_eq!(pair.variable, "air_temperature");
        assert_eq!(pair.raw, "air_temperature/raw");
        assert_eq!(pair.measured, "air_temperature/measured");
    }

    #[test]
    fn test_decode_message_and_bare_number() {
        assert_eq!(Float64::decode(r#"{"data": 21.5}"#).unwrap(), Float64::new(21.5));
        assert_eq!(Float64::decode("  -3 ").unwrap(), Float64::new(-3.0));
    }

    #[test]
    fn test_decode_rejects_non_numeric() {
        assert!(Float64::decode("\"warm\"").is_err());
        assert!(Float64::decode(r#"{"value": 1.0}"#).is_err());
        assert!(Float64::decode("").is_err());
    }
}
