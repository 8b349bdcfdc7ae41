//! Block device and invalid-source tests

mod common;

use common::MemoryBlockDevice;
use isoimg::device::{read_bytes_at, write_bytes_at, FileDevice};
use isoimg::{IsoBuilder, IsoError, IsoImage};

use std::io::Write;

#[test]
fn test_open_nonexistent_source() {
    // Mirrors open("foo"): rejected before any parsing is attempted
    let result = FileDevice::open("foo");
    assert_eq!(result.unwrap_err(), IsoError::InvalidArgument);

    let result = IsoImage::open_path("foo");
    assert_eq!(result.unwrap_err(), IsoError::InvalidArgument);
}

#[test]
fn test_open_non_file_source() {
    // A directory is not a readable image source
    let dir = tempfile::tempdir().expect("should create tempdir");
    let result = IsoImage::open_path(dir.path());
    assert_eq!(result.unwrap_err(), IsoError::InvalidArgument);
}

#[test]
fn test_open_path_reads_image() {
    let mut device = MemoryBlockDevice::with_sectors(64);
    let mut builder = IsoBuilder::new().volume_id("ONDISK");
    builder.add_file("/DATA.TXT;1", b"on disk").unwrap();
    builder.write(&mut device).unwrap();

    let dir = tempfile::tempdir().expect("should create tempdir");
    let path = dir.path().join("test.iso");
    let mut file = std::fs::File::create(&path).expect("should create file");
    file.write_all(&device.data).expect("should write image");
    drop(file);

    let (image, mut file_device) = IsoImage::open_path(&path).expect("should open image file");
    assert_eq!(image.pvd().volume_id, "ONDISK");

    let data_txt = image.find("/DATA.TXT").unwrap().clone();
    let data = image.read_file_vec(&mut file_device, &data_txt).unwrap();
    assert_eq!(data, b"on disk");
}

#[test]
fn test_write_image_to_file_device() {
    let dir = tempfile::tempdir().expect("should create tempdir");
    let path = dir.path().join("out.iso");

    let mut device = FileDevice::create(&path, 64).expect("should create image file");
    let mut builder = IsoBuilder::new().volume_id("CREATED");
    builder.add_file("/A.TXT;1", b"abc").unwrap();
    builder.write(&mut device).expect("should write");
    drop(device);

    let (image, _device) = IsoImage::open_path(&path).expect("should reopen from disk");
    assert_eq!(image.pvd().volume_id, "CREATED");
    assert_eq!(image.pvd().space_size, 25);
}

#[test]
fn test_read_bytes_at_crosses_sectors() {
    let mut device = MemoryBlockDevice::with_sectors(4);
    for (i, byte) in device.data.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }

    // Straddle the sector 1 / sector 2 boundary
    let mut buf = [0u8; 100];
    read_bytes_at(&mut device, 2 * 2048 - 50, &mut buf).expect("should read");
    for (i, &byte) in buf.iter().enumerate() {
        let offset = 2 * 2048 - 50 + i;
        assert_eq!(byte, (offset % 251) as u8);
    }
}

#[test]
fn test_write_bytes_at_preserves_surroundings() {
    let mut device = MemoryBlockDevice::with_sectors(4);
    device.data.fill(0xEE);

    write_bytes_at(&mut device, 2048 + 100, &[0x11; 8]).expect("should write");

    assert_eq!(device.data[2048 + 99], 0xEE);
    assert_eq!(&device.data[2048 + 100..2048 + 108], &[0x11; 8]);
    assert_eq!(device.data[2048 + 108], 0xEE);
}

#[test]
fn test_read_past_end_is_io_error() {
    let mut device = MemoryBlockDevice::with_sectors(2);
    let mut buf = [0u8; 16];
    let result = read_bytes_at(&mut device, 5 * 2048, &mut buf);
    assert_eq!(result.unwrap_err(), IsoError::IoError);
}
