//! Shared loading helpers

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use nether_dls::{Collection, LoadOptions};

/// Read load options from `path`, or use the defaults
pub fn load_options(path: Option<&Path>) -> Result<LoadOptions> {
    let Some(path) = path else {
        return Ok(LoadOptions::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let options = LoadOptions::from_toml_str(&text)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

    tracing::debug!(?options, "load options");
    Ok(options)
}

/// Open and load a collection file
pub fn open_collection(path: &Path, options: &LoadOptions) -> Result<Arc<Collection>> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Collection::load_with_options(&mut file, options)
        .with_context(|| format!("Failed to load DLS collection: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_without_config() {
        assert_eq!(load_options(None).unwrap(), LoadOptions::default());
    }

    #[test]
    fn test_options_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opts.toml");
        std::fs::write(&path, "strict = true\nmax_chunks = 10\n").unwrap();

        let options = load_options(Some(&path)).unwrap();
        assert!(options.strict);
        assert_eq!(options.max_chunks, 10);
    }

    #[test]
    fn test_bad_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "strict = \"sometimes\"").unwrap();

        let err = load_options(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_missing_collection_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_collection(&dir.path().join("nope.dls"), &LoadOptions::default());
        assert!(result.is_err());
    }
}
