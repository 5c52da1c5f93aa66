use crate::error::SerdeErr;

/// Reads bits back out of a byte buffer in the order BitWriter produced them
pub struct BitReader {
    buffer: Vec<u8>,
    bit_index: usize,
}

impl BitReader {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            buffer: bytes.to_vec(),
            bit_index: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let byte_index = self.bit_index / 8;
        let Some(byte) = self.buffer.get(byte_index) else {
            return Err(SerdeErr::EndOfBuffer {
                bit_index: self.bit_index,
                buffer_bits: self.buffer.len() * 8,
            });
        };
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let mut output: u8 = 0;
        for index in 0..8 {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    /// Number of bits consumed so far
    pub fn bits_read(&self) -> usize {
        self.bit_index
    }

    /// Number of whole-buffer bits not yet consumed, including trailing padding
    pub fn bits_remaining(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.bit_index)
    }
}
