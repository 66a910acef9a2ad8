use std::any::Any;
use std::fmt::Debug;

/// Opaque side-channel data attached to a serializable unit.
///
/// The contract never interprets the bag itself; it only hands it to the
/// extra-data predicates configured on a requirements engine. Consumers that
/// know the concrete bag type can recover it through [`ExtraData::as_any`].
pub trait ExtraData: Any + Debug {
    fn as_any(&self) -> &dyn Any;

    /// Whether this is the empty bag.
    fn is_null(&self) -> bool {
        false
    }
}

/// The empty extra-data bag.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExtraData;

impl NullExtraData {
    pub fn instance() -> &'static NullExtraData {
        static INSTANCE: NullExtraData = NullExtraData;
        &INSTANCE
    }
}

impl ExtraData for NullExtraData {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_null(&self) -> bool {
        true
    }
}
