use std::fmt;

use serde::{Deserialize, Serialize};

/// Deterministic 32-bit identifier for a remote call, derived from its
/// qualified name. The value is part of the wire format: it must never
/// change between builds for the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StableHash(i32);

impl StableHash {
    /// Hashes `name` over its UTF-16 code units: `h = h * 31 + c`, seeded with 23
    pub fn of(name: &str) -> Self {
        let mut hash: i32 = 23;
        for unit in name.encode_utf16() {
            hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
        }
        Self(hash)
    }

    pub fn from_raw(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for StableHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Qualified name of a remote call: `Type::Method`
pub fn qualified_name(type_name: &str, method_name: &str) -> String {
    format!("{}::{}", type_name, method_name)
}
