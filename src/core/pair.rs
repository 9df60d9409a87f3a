use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::ObjectId;

/// Unordered pair of object ids packed into a single key.
///
/// The lower id occupies the high 32 bits, so `IdPair::new(a, b)` equals
/// `IdPair::new(b, a)` and distinct unordered pairs never share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdPair(u64);

impl IdPair {
    pub fn new(a: ObjectId, b: ObjectId) -> Self {
        let (low, high) = canonical(a, b);
        Self((u64::from(low.raw()) << 32) | u64::from(high.raw()))
    }

    /// Builds a key from a pair that must already be ordered.
    ///
    /// # Panics
    /// Panics if `a >= b`: callers receive pairs from the broad-phase, which
    /// only ever emits ordered pairs of distinct ids.
    pub fn from_canonical(a: ObjectId, b: ObjectId) -> Self {
        assert!(a < b, "pair ({a}, {b}) is not canonical");
        Self::new(a, b)
    }

    pub fn low(self) -> ObjectId {
        ObjectId((self.0 >> 32) as u32)
    }

    pub fn high(self) -> ObjectId {
        ObjectId(self.0 as u32)
    }

    pub fn ids(self) -> (ObjectId, ObjectId) {
        (self.low(), self.high())
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn contains(self, id: ObjectId) -> bool {
        self.low() == id || self.high() == id
    }

    /// The partner of `id` in this pair, if `id` is a member.
    pub fn other(self, id: ObjectId) -> Option<ObjectId> {
        if self.low() == id {
            Some(self.high())
        } else if self.high() == id {
            Some(self.low())
        } else {
            None
        }
    }
}

impl fmt::Display for IdPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low(), self.high())
    }
}

/// Orders two ids ascending.
pub fn canonical(a: ObjectId, b: ObjectId) -> (ObjectId, ObjectId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
