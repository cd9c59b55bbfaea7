//! Payload decoders.

use super::binder::BindError;

/// Decoder turns a raw payload into a JSON document tree.
///
/// YAML payloads decode into the same tree, so binding works identically for
/// both formats.
pub trait Decoder {
    /// Decodes the payload. Decoding the same bytes twice yields the same
    /// document.
    fn decode(&self, payload: &[u8]) -> Result<serde_json::Value, BindError>;
}

/// JsonDecoder decodes JSON payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, payload: &[u8]) -> Result<serde_json::Value, BindError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// YamlDecoder decodes YAML payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl Decoder for YamlDecoder {
    fn decode(&self, payload: &[u8]) -> Result<serde_json::Value, BindError> {
        Ok(serde_yaml::from_slice(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_decoder() {
        let value = JsonDecoder.decode(br#"{"name":"a","tags":[1,2]}"#).unwrap();
        assert_eq!(value, json!({"name": "a", "tags": [1, 2]}));
        assert!(matches!(JsonDecoder.decode(b"{"), Err(BindError::Json(_))));
    }

    #[test]
    fn test_yaml_decoder() {
        let value = YamlDecoder.decode(b"name: a\ntags:\n  - 1\n  - 2\n").unwrap();
        assert_eq!(value, json!({"name": "a", "tags": [1, 2]}));
        assert!(matches!(YamlDecoder.decode(b"name: [a"), Err(BindError::Yaml(_))));
    }
}
