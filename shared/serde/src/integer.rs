use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, false, BITS>;
pub type SignedInteger<const BITS: u8> = SerdeInteger<true, false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<false, true, BITS>;
pub type SignedVariableInteger<const BITS: u8> = SerdeInteger<true, true, BITS>;

// Largest magnitude any variable-length integer may carry on the wire.
const MAX_VARIABLE_BITS: u32 = 64;

/// An integer encoded in exactly `BITS` bits, or, when `VARIABLE`, in
/// groups of `BITS` bits each preceded by a continuation bit. Signed
/// integers carry a leading sign bit followed by the magnitude.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    inner: i128,
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> SerdeInteger<SIGNED, VARIABLE, BITS> {
    /// # Panics
    ///
    /// Panics when the value cannot be represented with this encoding.
    pub fn new<T: Into<i128>>(value: T) -> Self {
        let value = value.into();
        assert!(BITS > 0, "can't create an integer with 0 bits");
        assert!(BITS < 128, "can't create an integer with more than 127 bits");
        assert!(
            SIGNED || value >= 0,
            "can't encode a negative number with an unsigned integer"
        );
        if !VARIABLE {
            let limit: u128 = 1_u128 << BITS;
            assert!(
                value.unsigned_abs() < limit,
                "with {} bits, can't encode number {}",
                BITS,
                value
            );
        }
        Self { inner: value }
    }

    pub fn get(&self) -> i128 {
        self.inner
    }

    /// Converts the value into a narrower integer type
    pub fn try_to<T: TryFrom<i128>>(&self, target: &'static str) -> Result<T, SerdeErr> {
        T::try_from(self.inner).map_err(|_| SerdeErr::OutOfRange {
            value: self.inner,
            target,
        })
    }

    fn write_group(writer: &mut dyn BitWrite, mut value: u128) -> u128 {
        for _ in 0..BITS {
            writer.write_bit(value & 1 != 0);
            value >>= 1;
        }
        value
    }

    fn read_group(reader: &mut BitReader) -> Result<u128, SerdeErr> {
        let mut group: u128 = 0;
        for index in 0..BITS {
            if reader.read_bit()? {
                group |= 1 << index;
            }
        }
        Ok(group)
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> Serde
    for SerdeInteger<SIGNED, VARIABLE, BITS>
{
    fn ser(&self, writer: &mut dyn BitWrite) {
        if SIGNED {
            writer.write_bit(self.inner < 0);
        }
        let mut magnitude = self.inner.unsigned_abs();

        if VARIABLE {
            loop {
                let proceed = magnitude >= (1_u128 << BITS);
                writer.write_bit(proceed);
                magnitude = Self::write_group(writer, magnitude);
                if !proceed {
                    return;
                }
            }
        } else {
            Self::write_group(writer, magnitude);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let negative = SIGNED && reader.read_bit()?;

        let magnitude = if VARIABLE {
            let mut output: u128 = 0;
            let mut shift: u32 = 0;
            loop {
                let proceed = reader.read_bit()?;
                if shift >= MAX_VARIABLE_BITS + u32::from(BITS) {
                    return Err(SerdeErr::VariableIntegerOverflow {
                        max_bits: MAX_VARIABLE_BITS,
                    });
                }
                output |= Self::read_group(reader)? << shift;
                shift += u32::from(BITS);
                if !proceed {
                    break output;
                }
            }
        } else {
            Self::read_group(reader)?
        };

        let value = magnitude as i128;
        Ok(Self {
            inner: if negative { -value } else { value },
        })
    }

    fn bit_length(&self) -> u32 {
        let mut output: u32 = 0;
        if SIGNED {
            output += 1;
        }
        if VARIABLE {
            let mut magnitude = self.inner.unsigned_abs();
            loop {
                output += 1 + u32::from(BITS);
                if magnitude < (1_u128 << BITS) {
                    break;
                }
                magnitude >>= BITS;
            }
        } else {
            output += u32::from(BITS);
        }
        output
    }
}

impl<const SIGNED: bool, const BITS: u8> ConstBitLength for SerdeInteger<SIGNED, false, BITS> {
    fn const_bit_length() -> u32 {
        let sign = if SIGNED { 1 } else { 0 };
        sign + u32::from(BITS)
    }
}
