//! Load options
//!
//! Options can be built in code or read from TOML:
//!
//! ```toml
//! max_chunks = 4096
//! strict = true
//! ```

use serde::{Deserialize, Serialize};

/// Default cap on top-level chunks visited during a load
pub const DEFAULT_MAX_CHUNKS: u32 = 65_536;

/// Collection loading options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Maximum number of top-level chunks walked before giving up (default: 65536)
    #[serde(default = "default_max_chunks")]
    pub max_chunks: u32,
    /// Fail the whole load on a malformed pool table or instrument (default: false)
    #[serde(default)]
    pub strict: bool,
}

fn default_max_chunks() -> u32 {
    DEFAULT_MAX_CHUNKS
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_chunks: DEFAULT_MAX_CHUNKS,
            strict: false,
        }
    }
}

impl LoadOptions {
    /// Strict options: every sub-chunk error fails the load
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Parse options from TOML; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let options = LoadOptions::from_toml_str("").unwrap();
        assert_eq!(options, LoadOptions::default());
        assert_eq!(options.max_chunks, DEFAULT_MAX_CHUNKS);
        assert!(!options.strict);
    }

    #[test]
    fn test_partial_toml() {
        let options = LoadOptions::from_toml_str("strict = true").unwrap();
        assert!(options.strict);
        assert_eq!(options.max_chunks, DEFAULT_MAX_CHUNKS);

        let options = LoadOptions::from_toml_str("max_chunks = 16").unwrap();
        assert_eq!(options.max_chunks, 16);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(LoadOptions::from_toml_str("max_chunks = \"lots\"").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let options = LoadOptions {
            max_chunks: 100,
            strict: true,
        };
        let text = toml::to_string(&options).unwrap();
        assert_eq!(LoadOptions::from_toml_str(&text).unwrap(), options);
    }
}
