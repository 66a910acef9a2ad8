use std::sync::{Arc, OnceLock};

use crate::error::SerialResult;
use crate::stream::{ReusableReader, ReusableWriter, Stream};
use crate::unit::Serializable;

use super::{Requirements, UnitView};

/// The engine that enforces nothing.
///
/// Every hook is a true no-op, whatever the input: no stream-capability
/// checks, no predicate evaluation, even with no stream at all. Units that
/// opt out of contract enforcement entirely, such as the null unit, carry
/// this engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRequirements;

impl NullRequirements {
    pub fn instance() -> &'static NullRequirements {
        static INSTANCE: NullRequirements = NullRequirements;
        &INSTANCE
    }

    /// The process-wide shared handle units hand out from `requirements()`.
    pub fn shared() -> Arc<dyn Requirements> {
        static SHARED: OnceLock<Arc<NullRequirements>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(NullRequirements)).clone()
    }
}

impl Requirements for NullRequirements {
    fn pre_validate_read(
        &self,
        _unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _reader: Option<&ReusableReader>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn post_validate_read(
        &self,
        _unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _reader: Option<&ReusableReader>,
        _unfixed_len: bool,
        _version_spec: Option<&dyn Serializable>,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn pre_validate_write(
        &self,
        _unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _writer: Option<&ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn post_validate_write(
        &self,
        _unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _writer: Option<&ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn pre_validate_check_magic(
        &self,
        _unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _reader: Option<&ReusableReader>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn post_validate_check_magic(
        &self,
        _unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _reader: Option<&ReusableReader>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        Ok(())
    }
}
