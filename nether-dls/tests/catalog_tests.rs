//! Tests for the public catalog API.
//!
//! Collections are built with the crate's own writer and loaded back through
//! `Collection::load`, the way a host would use the crate.

use std::io::Cursor;
use std::sync::Arc;

use nether_dls::{
    Collection, CollectionWriter, DRUM_KIT_FLAG, DlsError, FourCc, Instrument, LoadOptions,
    MidiLocale, PoolCue, PoolTable, RiffWriter, parse_descriptor,
};

fn instrument(bank: u32, program: u32, name: &str) -> Instrument {
    Instrument {
        name: name.to_string(),
        locale: MidiLocale { bank, program },
        ..Default::default()
    }
}

fn general_midi() -> Vec<u8> {
    let mut writer = CollectionWriter::new();
    writer.set_name("Integration Set");
    writer.set_pool(PoolTable::new(
        (0..128).map(|i| PoolCue { offset: i * 64 }).collect(),
    ));
    for program in 0..128 {
        writer.add_instrument(instrument(0, program, &format!("Program {program}")));
    }
    writer.add_instrument(instrument(DRUM_KIT_FLAG, 0, "Drums"));
    writer.write()
}

#[test]
fn test_every_patch_resolves() {
    let collection = Collection::load(&mut Cursor::new(general_midi())).unwrap();
    assert_eq!(collection.len(), 129);
    assert_eq!(collection.pool().unwrap().cue_count(), 128);

    for program in 0..128u32 {
        let found = collection.get_instrument(program).unwrap();
        assert_eq!(found.name(), format!("Program {program}"));
    }
    assert_eq!(
        collection
            .get_instrument(MidiLocale::from_patch(DRUM_KIT_FLAG).patch())
            .unwrap()
            .name(),
        "Drums"
    );
    // Bank 1 is empty
    assert!(collection.get_instrument(0x0000_0100).is_none());
}

#[test]
fn test_enumeration_terminates() {
    let collection = Collection::load(&mut Cursor::new(general_midi())).unwrap();

    let mut count = 0;
    while let Some(entry) = collection.enum_instrument(count, Some(8)) {
        assert!(entry.name.unwrap().chars().count() <= 7);
        count += 1;
    }
    assert_eq!(count, collection.len());
}

#[test]
fn test_concurrent_lookups() {
    let collection = Collection::load(&mut Cursor::new(general_midi())).unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4u32 {
            let collection = Arc::clone(&collection);
            scope.spawn(move || {
                for program in (worker..128).step_by(4) {
                    let found = collection.get_instrument(program).unwrap();
                    assert_eq!(found.patch(), program);
                }
            });
        }
    });
}

#[test]
fn test_instruments_outlive_collection() {
    let collection = Collection::load(&mut Cursor::new(general_midi())).unwrap();
    let violin = collection.get_instrument(40).unwrap();
    drop(collection);
    assert_eq!(violin.name(), "Program 40");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("set.dls");
    std::fs::write(&path, general_midi()).unwrap();

    let mut file = std::fs::File::open(&path).unwrap();
    let collection = Collection::load(&mut file).unwrap();
    assert_eq!(collection.len(), 129);

    let mut file = std::fs::File::open(&path).unwrap();
    let descriptor = parse_descriptor(&mut file).unwrap();
    assert_eq!(descriptor.name.as_deref(), Some("Integration Set"));
}

#[test]
fn test_not_a_collection() {
    let mut w = RiffWriter::new();
    w.begin_riff(FourCc(*b"AVI "));
    let result = Collection::load(&mut Cursor::new(w.finish()));
    assert!(matches!(result, Err(DlsError::NotDlsCollection(_))));

    let result = Collection::load(&mut Cursor::new(b"ID3\x03\0\0\0\0\0\0".to_vec()));
    assert!(matches!(result, Err(DlsError::NotRiff(_))));

    let result = Collection::load(&mut Cursor::new(Vec::new()));
    assert!(matches!(result, Err(DlsError::UnexpectedEof)));
}

#[test]
fn test_options_from_toml() {
    let options = LoadOptions::from_toml_str("max_chunks = 2\n").unwrap();
    let result = Collection::load_with_options(&mut Cursor::new(general_midi()), &options);
    assert!(matches!(result, Err(DlsError::TooManyChunks(2))));
}
