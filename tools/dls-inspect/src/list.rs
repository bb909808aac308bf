//! List command - enumerate a collection's instruments

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nether_dls::{Collection, LoadOptions, MidiLocale};

use crate::load::open_collection;

/// Longest instrument name printed (terminator included)
const NAME_CAPACITY: usize = 64;

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// DLS collection file
    pub file: PathBuf,
}

/// Execute the list command
pub fn execute(args: ListArgs, options: &LoadOptions) -> Result<()> {
    let collection = open_collection(&args.file, options)?;
    print!("{}", render(&collection));
    Ok(())
}

fn render(collection: &Collection) -> String {
    let mut out = String::new();

    let name = collection.descriptor().name.as_deref().unwrap_or("(unnamed)");
    let _ = writeln!(out, "=== {} ===", name);

    let declared = collection.header().and_then(|h| h.instrument_count());
    match declared {
        Some(count) if count as usize != collection.len() => {
            let _ = writeln!(
                out,
                "  Instruments: {} (header declares {})",
                collection.len(),
                count
            );
        }
        _ => {
            let _ = writeln!(out, "  Instruments: {}", collection.len());
        }
    }

    match collection.pool() {
        Some(pool) => {
            let _ = writeln!(out, "  Pool cues: {}", pool.cue_count());
        }
        None => {
            let _ = writeln!(out, "  Pool cues: (none)");
        }
    }

    let mut index = 0;
    while let Some(entry) = collection.enum_instrument(index, Some(NAME_CAPACITY)) {
        let locale = MidiLocale::from_patch(entry.patch);
        let _ = writeln!(
            out,
            "  [{:3}] 0x{:08X} bank {:3}/{:3} program {:3}{} {}",
            index,
            entry.patch,
            locale.bank_msb(),
            locale.bank_lsb(),
            locale.program,
            if locale.is_drum_kit() { " drums" } else { "" },
            entry.name.unwrap_or_default()
        );
        index += 1;
    }

    if !collection.diagnostics().is_empty() {
        let _ = writeln!(out, "  Diagnostics:");
        for diagnostic in collection.diagnostics() {
            let _ = writeln!(
                out,
                "    0x{:08X} '{}': {}",
                diagnostic.offset, diagnostic.id, diagnostic.error
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nether_dls::{
        CollectionWriter, DRUM_KIT_FLAG, FourCc, Instrument, PoolCue, PoolTable, RiffWriter,
    };
    use std::io::Cursor;

    fn instrument(bank: u32, program: u32, name: &str) -> Instrument {
        Instrument {
            name: name.to_string(),
            locale: MidiLocale { bank, program },
            ..Default::default()
        }
    }

    #[test]
    fn test_render_listing() {
        let mut writer = CollectionWriter::new();
        writer
            .set_name("Listing")
            .set_pool(PoolTable::new(vec![PoolCue { offset: 0 }]));
        writer.add_instrument(instrument(0x0000_0102, 5, "Bright Piano"));
        writer.add_instrument(instrument(DRUM_KIT_FLAG, 0, "Kit"));
        let collection = Collection::load(&mut Cursor::new(writer.write())).unwrap();

        let text = render(&collection);
        assert!(text.contains("=== Listing ==="));
        assert!(text.contains("Instruments: 2\n"));
        assert!(text.contains("Pool cues: 1"));
        assert!(text.contains("0x00010205 bank   1/  2 program   5 Bright Piano"));
        assert!(text.contains("0x80000000 bank   0/  0 program   0 drums Kit"));
        assert!(!text.contains("Diagnostics"));
    }

    #[test]
    fn test_render_diagnostics() {
        let mut w = RiffWriter::new();
        w.begin_riff(FourCc::DLS);
        w.chunk(FourCc::COLH, &2u32.to_le_bytes());
        w.chunk(FourCc::PTBL, &[8, 0, 0, 0, 5, 0, 0, 0]);
        let collection = Collection::load(&mut Cursor::new(w.finish())).unwrap();

        let text = render(&collection);
        assert!(text.contains("Instruments: 0 (header declares 2)"));
        assert!(text.contains("Pool cues: (none)"));
        assert!(text.contains("Diagnostics:"));
        assert!(text.contains("'ptbl': pool table size mismatch"));
    }

    #[test]
    fn test_execute_with_strict_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.dls");
        let mut w = RiffWriter::new();
        w.begin_riff(FourCc::DLS);
        w.chunk(FourCc::PTBL, &[8, 0, 0, 0, 5, 0, 0, 0]);
        std::fs::write(&path, w.finish()).unwrap();

        let args = || ListArgs { file: path.clone() };
        assert!(execute(args(), &LoadOptions::default()).is_ok());
        assert!(execute(args(), &LoadOptions::strict()).is_err());
    }
}
