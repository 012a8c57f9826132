use anyhow::{Context, Result};
use std::path::Path;

use afuc_rs::{Firmware, Generation};

#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub base: u32,
    pub bytes: Vec<u8>,
    pub perms: &'static str, // e.g., "r-x"
    pub kind: &'static str,  // e.g., "code"
}

#[derive(Debug, Clone)]
pub struct Image {
    pub fw_id: u32,
    pub generation: Generation,
    pub segments: Vec<Segment>,
}

impl Image {
    /// Single executable segment holding the instructions after the header.
    pub fn from_firmware(fw: &Firmware) -> Self {
        let seg = Segment { name: "code".into(), base: 0, bytes: fw.code().to_vec(), perms: "r-x", kind: "code" };
        Image { fw_id: fw.fw_id, generation: fw.generation, segments: vec![seg] }
    }
}

pub fn load_firmware(path: &Path, gen_override: Option<Generation>) -> Result<Image> {
    let file = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut fw = Firmware::parse(&file)?;
    if let Some(gen) = gen_override {
        fw = fw.with_generation(gen);
    }
    Ok(Image::from_firmware(&fw))
}

pub fn read_u8(img: &Image, addr: u32) -> Option<u8> {
    for s in &img.segments {
        let start = s.base;
        let end = s.base.wrapping_add(s.bytes.len() as u32);
        if addr >= start && addr < end {
            let off = (addr - start) as usize;
            return Some(s.bytes[off]);
        }
    }
    None
}

pub fn read_u32(img: &Image, addr: u32) -> Option<u32> {
    let b0 = read_u8(img, addr)?;
    let b1 = read_u8(img, addr.wrapping_add(1))?;
    let b2 = read_u8(img, addr.wrapping_add(2))?;
    let b3 = read_u8(img, addr.wrapping_add(3))?;
    Some(u32::from_le_bytes([b0, b1, b2, b3]))
}

/// True when a whole instruction word at `addr` is inside the image.
pub fn is_mapped(img: &Image, addr: u32) -> bool {
    img.segments.iter().any(|s| {
        let start = s.base;
        let end = s.base.wrapping_add(s.bytes.len() as u32);
        addr >= start && addr.checked_add(4).is_some_and(|last| last <= end)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_strips_header_and_detects_generation() {
        let path = std::env::temp_dir().join("_afuc_model_test.fw");
        let mut bytes = vec![0xaa, 0xbb, 0xcc, 0xdd];
        bytes.extend_from_slice(&0x0074_0000u32.to_le_bytes());
        bytes.extend_from_slice(&0x0100_0000u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2]);
        std::fs::write(&path, &bytes).unwrap();

        let img = load_firmware(&path, None).unwrap();
        assert_eq!(img.fw_id, 0x740);
        assert_eq!(img.generation, Generation::Gen7);
        let s = &img.segments[0];
        assert_eq!(s.base, 0);
        assert_eq!(s.bytes.len(), 10);
        assert_eq!(read_u32(&img, 0).unwrap(), 0x0074_0000);
        assert_eq!(read_u32(&img, 4).unwrap(), 0x0100_0000);
        assert!(is_mapped(&img, 4));
        // trailing two bytes do not form a word
        assert!(!is_mapped(&img, 8));
        assert!(read_u32(&img, 8).is_none());

        let img = load_firmware(&path, Some(Generation::Gen5)).unwrap();
        assert_eq!(img.generation, Generation::Gen5);
        let _ = std::fs::remove_file(&path);
    }
}
