//! Serialization utilities with error handling.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializes data to compact JSON.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string.
///
/// Blank input is a validation error rather than a parse error so callers
/// can tell an empty file from a corrupt one.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

pub(crate) fn from_json_bytes<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let json = std::str::from_utf8(bytes)
        .map_err(|e| IoError::validation(format!("Invalid UTF-8 in JSON: {}", e)))?;
    from_json(json)
}

pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = to_json_pretty(data)?;
    std::fs::write(&path, json).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing JSON to {:?}", path.as_ref()))
    })?;
    Ok(())
}

pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading JSON from {:?}", path.as_ref()))
    })?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biolife_data::{Bounds, Color};

    #[test]
    fn test_json_preserves_plain_data() {
        let bounds = Bounds::new(10.0, 20.0, 300.0, 200.0);
        let restored: Bounds = from_json(&to_json(&bounds).unwrap()).unwrap();
        assert_eq!(restored, bounds);
    }

    #[test]
    fn test_empty_json_is_validation_error() {
        let result: Result<Color> = from_json("   ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_garbage_json_is_serialization_error() {
        let result: Result<Color> = from_json("{\"r\": 1,");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result: Result<Color> = from_json_bytes(&[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(IoError::Validation(_))));
    }
}
