//! Info command - print a collection's descriptor without loading instruments

use std::fmt::Write as _;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use nether_dls::{ObjectDescriptor, parse_descriptor};

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// DLS collection file
    pub file: PathBuf,
}

/// Execute the info command
pub fn execute(args: InfoArgs) -> Result<()> {
    let mut file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let descriptor = parse_descriptor(&mut file)
        .with_context(|| format!("Failed to read descriptor: {}", args.file.display()))?;

    print!("{}", render(&args.file, &descriptor));
    Ok(())
}

fn render(path: &Path, descriptor: &ObjectDescriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== DLS Collection ===");
    let _ = writeln!(out, "  File: {}", path.display());
    let _ = writeln!(
        out,
        "  Name: {}",
        descriptor.name.as_deref().unwrap_or("(unnamed)")
    );
    if let Some(version) = descriptor.version {
        let _ = writeln!(out, "  Version: {}", version);
    }
    if let Some(class_id) = descriptor.class_id {
        let _ = writeln!(out, "  Class: {:?}", class_id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nether_dls::{COLLECTION_CLASS_ID, CollectionWriter, Version};

    #[test]
    fn test_render_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.dls");
        let mut writer = CollectionWriter::new();
        writer
            .set_name("Test Set")
            .set_version(Version { ms: 0x0002_0000, ls: 0 });
        std::fs::write(&path, writer.write()).unwrap();

        let descriptor = parse_descriptor(&mut File::open(&path).unwrap()).unwrap();
        let text = render(&path, &descriptor);
        assert!(text.contains("Name: Test Set"));
        assert!(text.contains("Version: 2.0.0.0"));
        assert!(text.contains(&format!("{:?}", COLLECTION_CLASS_ID)));
    }

    #[test]
    fn test_unnamed_collection() {
        let text = render(Path::new("x.dls"), &ObjectDescriptor::default());
        assert!(text.contains("Name: (unnamed)"));
        assert!(!text.contains("Version"));
    }

    #[test]
    fn test_execute_rejects_non_dls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.wav");
        std::fs::write(&path, b"RIFF\x04\0\0\0WAVE").unwrap();
        assert!(execute(InfoArgs { file: path }).is_err());
    }
}
