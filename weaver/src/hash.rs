use std::collections::HashMap;

use rpcweave_shared::StableHash;

use crate::error::CollisionError;

/// Hands out the stable hash of each qualified name and rejects any hash
/// already taken by a different name in the same module
#[derive(Debug, Default)]
pub struct HashAssigner {
    assigned: HashMap<StableHash, String>,
}

impl HashAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, qualified_name: &str) -> Result<StableHash, CollisionError> {
        let hash = StableHash::of(qualified_name);
        match self.assigned.get(&hash) {
            Some(first) if first != qualified_name => Err(CollisionError {
                hash,
                first: first.clone(),
                second: qualified_name.to_string(),
            }),
            Some(_) => Ok(hash),
            None => {
                self.assigned.insert(hash, qualified_name.to_string());
                Ok(hash)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
