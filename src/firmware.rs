//! Firmware image container.
//!
//! Layout: a 4-byte header word, then instructions. Code is mapped at
//! address 0, so byte 4 of the file is instruction address 0. The first
//! instruction is a `nop` whose payload bits 12..23 carry the firmware id.

use crate::decoder::Generation;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FirmwareError {
    #[error("firmware image too short: {len} bytes, need at least 8")]
    TooShort { len: usize },
}

const KNOWN_IDS: &[(u32, Generation)] = &[
    (0x730, Generation::Gen7), // A730
    (0x740, Generation::Gen7), // A740
    (0x512, Generation::Gen7), // GEN70500
    (0x520, Generation::Gen7), // A750
    (0x6ee, Generation::Gen6), // A630
    (0x6dc, Generation::Gen6), // A650
    (0x6dd, Generation::Gen6), // A660
    (0x5ff, Generation::Gen5), // A530
];

pub fn firmware_id(word1: u32) -> u32 {
    (word1 >> 12) & 0xfff
}

pub fn is_known_firmware_id(id: u32) -> bool {
    KNOWN_IDS.iter().any(|&(k, _)| k == id)
}

pub fn detect_generation(fw_id: u32) -> Generation {
    if let Some(&(_, gen)) = KNOWN_IDS.iter().find(|&&(k, _)| k == fw_id) {
        return gen;
    }
    let gen = match fw_id {
        0x700.. => Generation::Gen7,
        0x600.. => Generation::Gen6,
        // 0x5xx ids below 0x530 belong to a7xx parts
        0x500..=0x52f => Generation::Gen7,
        0x500.. => Generation::Gen5,
        _ => Generation::Gen6,
    };
    tracing::debug!(fw_id, %gen, "unknown firmware id, guessing generation from range");
    gen
}

fn le_word(bytes: &[u8], off: usize) -> Option<u32> {
    match bytes.get(off..off + 4)? {
        &[a, b, c, d] => Some(u32::from_le_bytes([a, b, c, d])),
        _ => None,
    }
}

/// Cheap content sniff: the first instruction is a `nop` and the id is one we
/// recognise.
pub fn looks_like_firmware(bytes: &[u8]) -> bool {
    match le_word(bytes, 4) {
        Some(w1) => w1 >> 26 == 0 && is_known_firmware_id(firmware_id(w1)),
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct Firmware {
    pub header: u32,
    pub fw_id: u32,
    pub generation: Generation,
    bytes: Vec<u8>,
}

impl Firmware {
    pub fn parse(bytes: &[u8]) -> Result<Firmware, FirmwareError> {
        let (Some(header), Some(word1)) = (le_word(bytes, 0), le_word(bytes, 4)) else {
            return Err(FirmwareError::TooShort { len: bytes.len() });
        };
        let fw_id = firmware_id(word1);
        let generation = detect_generation(fw_id);
        tracing::info!(
            fw_id = format_args!("{fw_id:#05x}"),
            %generation,
            instructions = (bytes.len() - 4) / 4,
            "firmware loaded"
        );
        Ok(Firmware { header, fw_id, generation, bytes: bytes.to_vec() })
    }

    pub fn with_generation(mut self, gen: Generation) -> Self {
        self.generation = gen;
        self
    }

    /// Instruction bytes, starting at address 0.
    pub fn code(&self) -> &[u8] {
        &self.bytes[4..]
    }

    pub fn len(&self) -> usize {
        self.code().len()
    }

    pub fn is_empty(&self) -> bool {
        self.code().is_empty()
    }

    /// `(address, raw word)` for every whole word of code.
    pub fn words(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.code()
            .chunks_exact(4)
            .enumerate()
            .map(|(i, c)| ((i * 4) as u32, u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
    }
}
