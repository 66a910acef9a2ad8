/// A type-identifying marker read off the front of an encoded unit.
///
/// Concrete units produce one from their magic hook; `check_magic` hands it
/// to the caller's acceptance predicate without committing to a full read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MagicValue {
    U32(u32),
    U64(u64),
    Bytes(Vec<u8>),
}

impl MagicValue {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            MagicValue::U32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MagicValue::U64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MagicValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<u32> for MagicValue {
    fn from(value: u32) -> MagicValue {
        MagicValue::U32(value)
    }
}

impl From<u64> for MagicValue {
    fn from(value: u64) -> MagicValue {
        MagicValue::U64(value)
    }
}

impl From<Vec<u8>> for MagicValue {
    fn from(bytes: Vec<u8>) -> MagicValue {
        MagicValue::Bytes(bytes)
    }
}

impl From<[u8; 4]> for MagicValue {
    fn from(bytes: [u8; 4]) -> MagicValue {
        MagicValue::Bytes(bytes.to_vec())
    }
}
