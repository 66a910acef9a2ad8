pub mod engine;  pub use engine::*;
pub mod null;    pub use null::*;

use crate::error::SerialResult;
use crate::extra::ExtraData;
use crate::stream::{ReusableReader, ReusableWriter, Stream};
use crate::unit::Serializable;

/// The facets of a unit that validation hooks may consult.
#[derive(Clone, Copy)]
pub struct UnitView<'a> {
    /// Type label of the unit, used to attribute failures.
    pub label:      &'static str,
    /// The unit's parent (the unit itself when no parent is assigned).
    pub parent:     &'a dyn Serializable,
    /// The unit's extra-data bag.
    pub extra_data: &'a dyn ExtraData,
}

/// Pluggable pre/post conditions around every serialization operation.
///
/// An engine is constructed once and shared by reference between units; the
/// hooks never mutate it. Each hook either accepts the call or returns the
/// error that aborts it. The stream arrives as an `Option` so an engine can
/// be probed with no stream at all; the wrapped operations always pass
/// `Some`.
pub trait Requirements: Send + Sync {
    fn pre_validate_read(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        reader: Option<&ReusableReader>,
        unfixed_len: bool,
    ) -> SerialResult<()>;

    fn post_validate_read(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        reader: Option<&ReusableReader>,
        unfixed_len: bool,
        version_spec: Option<&dyn Serializable>,
    ) -> SerialResult<()>;

    fn pre_validate_write(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        writer: Option<&ReusableWriter>,
        version_spec: Option<&dyn Serializable>,
        unfixed_len: bool,
    ) -> SerialResult<()>;

    fn post_validate_write(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        writer: Option<&ReusableWriter>,
        version_spec: Option<&dyn Serializable>,
        unfixed_len: bool,
    ) -> SerialResult<()>;

    fn pre_validate_check_magic(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        reader: Option<&ReusableReader>,
        unfixed_len: bool,
    ) -> SerialResult<()>;

    fn post_validate_check_magic(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        reader: Option<&ReusableReader>,
        unfixed_len: bool,
    ) -> SerialResult<()>;
}
