use thiserror::Error;

/// Errors raised while reading a value back out of a bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran past the end of its buffer
    #[error("Attempted to read bit {bit_index} from a buffer of {buffer_bits} bits")]
    EndOfBuffer { bit_index: usize, buffer_bits: usize },

    /// A variable-length integer kept signalling continuation past the width it can hold
    #[error("Variable-length integer exceeded {max_bits} bits")]
    VariableIntegerOverflow { max_bits: u32 },

    /// A decoded integer does not fit in the requested type
    #[error("Decoded value {value} is out of range for {target}")]
    OutOfRange { value: i128, target: &'static str },

    /// String payload was not valid UTF-8
    #[error("String payload of {byte_length} bytes is not valid UTF-8")]
    InvalidUtf8 { byte_length: usize },
}
