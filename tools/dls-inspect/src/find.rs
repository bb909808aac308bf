//! Find command - look up one instrument by patch number

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nether_dls::{Instrument, LoadOptions};

use crate::load::open_collection;

/// Arguments for the find command
#[derive(Args)]
pub struct FindArgs {
    /// DLS collection file
    pub file: PathBuf,

    /// Patch number, decimal or hex (e.g. 0x80000000 for the drum kit on bank 0)
    #[arg(long, value_parser = parse_patch)]
    pub patch: u32,
}

/// Execute the find command
pub fn execute(args: FindArgs, options: &LoadOptions) -> Result<()> {
    let collection = open_collection(&args.file, options)?;

    let Some(instrument) = collection.get_instrument(args.patch) else {
        anyhow::bail!("No instrument with patch 0x{:08X}", args.patch);
    };

    print!("{}", render(&instrument));
    Ok(())
}

/// Parse a patch number given as decimal or `0x` hex
fn parse_patch(text: &str) -> Result<u32, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid patch '{}': {}", text, e))
}

fn render(instrument: &Instrument) -> String {
    let locale = instrument.locale;
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", instrument.name());
    let _ = writeln!(out, "  Patch: 0x{:08X}", instrument.patch());
    let _ = writeln!(
        out,
        "  Bank: {}/{}{}",
        locale.bank_msb(),
        locale.bank_lsb(),
        if locale.is_drum_kit() { " (drum kit)" } else { "" }
    );
    let _ = writeln!(out, "  Program: {}", locale.program);
    if let Some(dlid) = instrument.dlid {
        let _ = writeln!(out, "  DLID: {:?}", dlid);
    }
    let _ = writeln!(out, "  Articulators: {}", instrument.articulators.len());
    let _ = writeln!(out, "  Regions: {}", instrument.regions.len());

    for (i, region) in instrument.regions.iter().enumerate() {
        let _ = write!(
            out,
            "    [{}] keys {}-{} vel {}-{}",
            i,
            region.key_range.low,
            region.key_range.high,
            region.velocity_range.low,
            region.velocity_range.high
        );
        if let Some(link) = region.wave_link {
            let _ = write!(out, " wave {}", link.table_index);
        }
        if let Some(sample) = &region.wave_sample {
            let _ = write!(out, " unity {}", sample.unity_note);
            if !sample.loops.is_empty() {
                let _ = write!(out, " loops {}", sample.loops.len());
            }
        }
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nether_dls::{
        CollectionWriter, DRUM_KIT_FLAG, MidiLocale, Region, RegionRange, WaveLink, WaveSample,
    };

    #[test]
    fn test_parse_patch() {
        assert_eq!(parse_patch("42"), Ok(42));
        assert_eq!(parse_patch("0x80000000"), Ok(DRUM_KIT_FLAG));
        assert_eq!(parse_patch("0X0001_0205"), Ok(0x0001_0205));
        assert!(parse_patch("0xZZ").is_err());
        assert!(parse_patch("-1").is_err());
        assert!(parse_patch("").is_err());
    }

    fn bass() -> Instrument {
        Instrument {
            name: "Finger Bass".to_string(),
            locale: MidiLocale {
                bank: 0,
                program: 33,
            },
            declared_regions: 1,
            regions: vec![Region {
                key_range: RegionRange { low: 20, high: 70 },
                wave_sample: Some(WaveSample {
                    unity_note: 40,
                    ..Default::default()
                }),
                wave_link: Some(WaveLink {
                    table_index: 3,
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_instrument() {
        let text = render(&bass());
        assert!(text.contains("=== Finger Bass ==="));
        assert!(text.contains("Patch: 0x00000021"));
        assert!(text.contains("Program: 33"));
        assert!(text.contains("[0] keys 20-70 vel 0-127 wave 3 unity 40\n"));
        assert!(!text.contains("drum kit"));
    }

    #[test]
    fn test_execute_hit_and_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bass.dls");
        let mut writer = CollectionWriter::new();
        writer.add_instrument(bass());
        std::fs::write(&path, writer.write()).unwrap();

        let options = LoadOptions::default();
        let hit = FindArgs {
            file: path.clone(),
            patch: 33,
        };
        assert!(execute(hit, &options).is_ok());

        let miss = FindArgs { file: path, patch: 34 };
        let err = execute(miss, &options).unwrap_err();
        assert!(err.to_string().contains("0x00000022"));
    }
}
