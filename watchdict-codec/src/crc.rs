//! STM32-compatible CRC-32
//!
//! Matches the STM32 hardware CRC unit and the SDK's resource tooling:
//! polynomial 0x04C11DB7, initial value 0xFFFFFFFF, no reflection and no
//! final XOR. Data is consumed as little-endian 32-bit words. A trailing
//! partial word is zero-padded in front of its bytes.

const POLY: u32 = 0x04C1_1DB7;
const INIT: u32 = 0xFFFF_FFFF;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut rr = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            rr = if rr & 0x8000_0000 != 0 {
                (rr << 1) ^ POLY
            } else {
                rr << 1
            };
            bit += 1;
        }
        table[i] = rr;
        i += 1;
    }
    table
}

/// Incremental CRC state
///
/// Each call to [`Crc32::update`] must pass a multiple of four bytes except
/// for the last one; a short trailing word is padded as if it ended the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32 {
    crc: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub const fn new() -> Self {
        Self { crc: INIT }
    }

    /// Feed bytes into the CRC
    pub fn update(&mut self, data: &[u8]) {
        for word in data.chunks(4) {
            if word.len() == 4 {
                for &byte in word.iter().rev() {
                    self.feed(byte);
                }
            } else {
                for _ in word.len()..4 {
                    self.feed(0);
                }
                for &byte in word {
                    self.feed(byte);
                }
            }
        }
    }

    /// Final CRC value
    pub fn finish(self) -> u32 {
        self.crc
    }

    fn feed(&mut self, byte: u8) {
        let index = ((self.crc >> 24) as u8 ^ byte) as usize;
        self.crc = (self.crc << 8) ^ TABLE[index];
    }
}

/// CRC of a complete buffer
pub fn stm32_crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finish()
}
