use afuc_rs::decoder::{Decoder, Generation, Op};
use afuc_rs::firmware::{detect_generation, looks_like_firmware, Firmware, FirmwareError};
use afuc_rs::AfucDecoder;
use pretty_assertions::assert_eq;

fn image(fw_id: u32, code: &[u32]) -> Vec<u8> {
    let mut bytes = 0x1234_5678u32.to_le_bytes().to_vec();
    // the first instruction is a nop carrying the id
    bytes.extend((0x0100_0000 | (fw_id << 12)).to_le_bytes());
    for w in code {
        bytes.extend(w.to_le_bytes());
    }
    bytes
}

#[test]
fn a6xx_image_end_to_end() {
    // 0x04: add $01, $02, $03 ; 0x08: ret
    let add = (0x13 << 27) | (2 << 21) | (3 << 16) | (1 << 11) | 0x01;
    let bytes = image(0x6ee, &[add, 0x34 << 26]);
    assert!(looks_like_firmware(&bytes));

    let fw = Firmware::parse(&bytes).unwrap();
    assert_eq!(fw.header, 0x1234_5678);
    assert_eq!(fw.fw_id, 0x6ee);
    assert_eq!(fw.generation, Generation::Gen6);
    assert_eq!(fw.len(), 12);

    let dec = AfucDecoder::new(fw.generation);
    let ops: Vec<(u32, Op)> = fw.words().map(|(a, w)| (a, dec.decode(w).op)).collect();
    assert_eq!(ops, vec![(0, Op::Nop), (4, Op::Add), (8, Op::Ret)]);
}

#[test]
fn generation_override() {
    let fw = Firmware::parse(&image(0x6ee, &[])).unwrap().with_generation(Generation::Gen7);
    assert_eq!(fw.generation, Generation::Gen7);
    assert_eq!(fw.fw_id, 0x6ee);
}

#[test]
fn known_and_fallback_ids() {
    assert_eq!(detect_generation(0x730), Generation::Gen7);
    assert_eq!(detect_generation(0x520), Generation::Gen7);
    assert_eq!(detect_generation(0x6dc), Generation::Gen6);
    assert_eq!(detect_generation(0x5ff), Generation::Gen5);
    assert_eq!(detect_generation(0x7aa), Generation::Gen7);
    assert_eq!(detect_generation(0x650), Generation::Gen6);
    assert_eq!(detect_generation(0x540), Generation::Gen5);
}

#[test]
fn sniffing() {
    assert!(looks_like_firmware(&image(0x730, &[])));
    // unknown id
    assert!(!looks_like_firmware(&image(0x123, &[])));
    // first instruction is not a nop
    let mut bytes = image(0x6ee, &[]);
    bytes[7] = 0xc8;
    assert!(!looks_like_firmware(&bytes));
    assert!(!looks_like_firmware(&[0; 6]));
}

#[test]
fn too_short() {
    assert_eq!(Firmware::parse(&[1, 2, 3]).unwrap_err(), FirmwareError::TooShort { len: 3 });
    assert_eq!(Firmware::parse(&[0; 7]).unwrap_err(), FirmwareError::TooShort { len: 7 });
    assert_eq!(
        FirmwareError::TooShort { len: 3 }.to_string(),
        "firmware image too short: 3 bytes, need at least 8"
    );
}

#[test]
fn trailing_partial_word_is_ignored() {
    let mut bytes = image(0x6ee, &[0x34 << 26]);
    bytes.extend([0xaa, 0xbb]);
    let fw = Firmware::parse(&bytes).unwrap();
    assert_eq!(fw.len(), 10);
    assert_eq!(fw.words().count(), 2);
}
