use ntprims::{
    encode_dos_attrib, encode_dos_attrib_at, file_attributes, from_hex, parse_datetime, to_hex,
    DosInfo, EpochTimestamp, PrimError, Uint64,
};
use std::thread;

#[test]
fn parsed_time_feeds_the_encoder() {
    let created = parse_datetime("2023-06-15T14:30:45.25Z").unwrap();
    let blob = encode_dos_attrib_at(file_attributes::ARCHIVE, created);

    let ticks = u64::from_le_bytes(blob[40..48].try_into().unwrap());
    let expected = Uint64::new(created.seconds)
        .add(11_644_473_600u64)
        .mul(10_000_000u64)
        .add(2_500_000u32);
    assert_eq!(ticks, expected.get());

    let (lower, upper) = Uint64::new(ticks).to_words();
    assert_eq!(&blob[40..44], &lower.to_le_bytes());
    assert_eq!(&blob[44..48], &upper.to_le_bytes());
}

#[test]
fn unix_epoch_blob_matches_reference_hex() {
    let blob = encode_dos_attrib(0x20, 0, 0);
    assert_eq!(
        to_hex(&blob),
        concat!(
            "30783230", "00", "00", // "0x20" NUL pad
            "03000300", "0000",     // version pair, pad
            "11000000", "20000000", // valid flags, attrib
            "00000000", "00000000", "00000000", "00000000", "00000000",
            "00803ed5deb19d01",     // 116444736000000000
            "00000000", "00000000",
        )
    );
}

#[test]
fn hex_blob_decodes() {
    let hex = to_hex(&encode_dos_attrib(file_attributes::DIRECTORY, 86_400, 100));
    let info = DosInfo::from_bytes(&from_hex(&hex).unwrap()).unwrap();
    assert_eq!(info.attribute, file_attributes::DIRECTORY);
    assert_eq!(info.create_time(), EpochTimestamp::new(86_400, 100));
}

#[test]
fn errors_are_distinct() {
    assert!(matches!(parse_datetime("yesterday"), Err(PrimError::Parse)));
    assert!(matches!(
        Uint64::new(1).div(0u32),
        Err(PrimError::DivisionByZero)
    ));
    assert_eq!(Uint64::MAX.add(1u32), Uint64::ZERO);
}

#[test]
fn primitives_are_usable_across_threads() {
    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            thread::spawn(move || {
                let text = format!("1970-01-0{}T00:00:00Z", i + 1);
                let ts = parse_datetime(&text).unwrap();
                let blob = encode_dos_attrib(i as u32, ts.seconds, 0);
                (ts.seconds, DosInfo::from_bytes(&blob).unwrap().attribute)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let (seconds, attribute) = handle.join().unwrap();
        assert_eq!(seconds, i as u64 * 86_400);
        assert_eq!(attribute, i as u32);
    }
}
