//! Read → write → read round-trip tests

mod common;

use common::MemoryBlockDevice;
use isoimg::{
    write_image, DirectoryRecord, ImageContentSource, IsoBuilder, IsoImage,
};

fn build_source_image() -> MemoryBlockDevice {
    let mut device = MemoryBlockDevice::with_sectors(128);
    let mut builder = IsoBuilder::new()
        .volume_id("ROUNDTRIP")
        .system_id("TESTSYS")
        .application_id("ISOIMG TESTS");
    builder.add_directory("/ETC").unwrap();
    builder.add_directory("/USR").unwrap();
    builder.add_directory("/USR/BIN").unwrap();
    builder.add_file("/ETC/MOTD.;1", b"welcome\n").unwrap();
    builder.add_file("/USR/BIN/TOOL.;1", &[0xAB; 4097]).unwrap();
    builder.add_file("/README.TXT;1", b"read me first").unwrap();
    builder.write(&mut device).expect("should write source image");
    device
}

fn assert_same_shape(a: &DirectoryRecord, b: &DirectoryRecord) {
    assert_eq!(a.file_ident, b.file_ident);
    assert_eq!(a.isdir(), b.isdir());
    assert_eq!(a.data_length, b.data_length);
    assert_eq!(a.children.len(), b.children.len());
    for (ca, cb) in a.children.iter().zip(&b.children) {
        if !ca.is_dot() && !ca.is_dot_dot() && ca.isdir() {
            assert_same_shape(ca, cb);
        } else {
            assert_eq!(ca.file_ident, cb.file_ident);
        }
    }
}

#[test]
fn test_round_trip_identity() {
    let mut source = build_source_image();
    let image = IsoImage::open(&mut source).expect("should open source");
    let mut pvd = image.pvd().clone();

    let mut dest = MemoryBlockDevice::with_sectors(128);
    {
        let mut contents = ImageContentSource::new(&mut source, 2048);
        write_image(&mut pvd, &mut dest, &mut contents).expect("should rewrite");
    }

    let reopened = IsoImage::open(&mut dest).expect("should reopen");

    // Identical volume descriptor scalars
    let before = image.pvd();
    let after = reopened.pvd();
    assert_eq!(after.space_size, before.space_size);
    assert_eq!(after.log_block_size, before.log_block_size);
    assert_eq!(after.path_tbl_size, before.path_tbl_size);
    assert_eq!(after.path_table_location_le, before.path_table_location_le);
    assert_eq!(after.path_table_location_be, before.path_table_location_be);
    assert_eq!(after.seqnum, before.seqnum);
    assert_eq!(after.volume_id, before.volume_id);
    assert_eq!(after.system_id, before.system_id);
    assert_eq!(after.application_id, before.application_id);

    // Identical tree shape
    assert_same_shape(image.root(), reopened.root());

    // Identical path table
    assert_eq!(image.path_table(), reopened.path_table());
}

#[test]
fn test_round_trip_preserves_content() {
    let mut source = build_source_image();
    let image = IsoImage::open(&mut source).expect("should open source");
    let mut pvd = image.pvd().clone();

    let mut dest = MemoryBlockDevice::with_sectors(128);
    {
        let mut contents = ImageContentSource::new(&mut source, 2048);
        write_image(&mut pvd, &mut dest, &mut contents).expect("should rewrite");
    }

    let reopened = IsoImage::open(&mut dest).expect("should reopen");
    for path in ["/ETC/MOTD", "/USR/BIN/TOOL", "/README.TXT"] {
        let original = image.find(path).unwrap().clone();
        let copied = reopened.find(path).unwrap().clone();

        let a = image.read_file_vec(&mut source, &original).unwrap();
        let b = reopened.read_file_vec(&mut dest, &copied).unwrap();
        assert_eq!(a, b, "content of {path} must survive the round trip");
    }
}

#[test]
fn test_rewrite_is_byte_stable() {
    // Writing the same parsed tree twice produces identical images
    let mut source = build_source_image();
    let image = IsoImage::open(&mut source).expect("should open source");

    let mut first = MemoryBlockDevice::with_sectors(128);
    let mut second = MemoryBlockDevice::with_sectors(128);
    for dest in [&mut first, &mut second] {
        let mut pvd = image.pvd().clone();
        let mut contents = ImageContentSource::new(&mut source, 2048);
        write_image(&mut pvd, dest, &mut contents).expect("should rewrite");
    }

    assert_eq!(first.data, second.data);
}
