use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::error::{BodyResult, SerialResult};
use crate::extra::{ExtraData, NullExtraData};
use crate::magic::MagicValue;
use crate::requirements::{NullRequirements, Requirements};
use crate::stream::{ReusableReader, ReusableWriter, Stream};

use super::{Serializable, UnitHandle};

/// The unit that is always safe to call.
///
/// Placeholder slots in a larger object graph hold one of these instead of
/// an absent unit, so callers never null-check: `read` yields no specifier,
/// `write` moves no bytes, `check_magic` accepts, and none of them touch the
/// stream or consult a requirements engine. It is its own parent and carries
/// the null engine and the empty bag.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSerializable;

impl NullSerializable {
    pub fn instance() -> &'static NullSerializable {
        static INSTANCE: NullSerializable = NullSerializable;
        &INSTANCE
    }

    /// The process-wide shared handle for parent and version-spec slots.
    pub fn shared() -> UnitHandle {
        static SHARED: OnceLock<Arc<NullSerializable>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(NullSerializable)).clone()
    }
}

impl Serializable for NullSerializable {
    fn type_label(&self) -> &'static str {
        "NullSerializable"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parent(&self) -> &dyn Serializable {
        self
    }

    fn requirements(&self) -> Arc<dyn Requirements> {
        NullRequirements::shared()
    }

    fn extra_data(&self) -> &dyn ExtraData {
        NullExtraData::instance()
    }

    fn read_body(
        &mut self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<Option<UnitHandle>> {
        Ok(None)
    }

    fn write_body(
        &self,
        _stream: &mut dyn Stream,
        _writer: Option<&mut ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> BodyResult<()> {
        Ok(())
    }

    fn read_magic(
        &self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> BodyResult<MagicValue> {
        Ok(MagicValue::Bytes(Vec::new()))
    }

    // The wrapped operations are overridden outright: the null unit skips
    // validation as well as the stream.

    fn read(
        &mut self,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> SerialResult<Option<UnitHandle>> {
        Ok(None)
    }

    fn write(
        &self,
        _stream: &mut dyn Stream,
        _writer: Option<&mut ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        Ok(())
    }

    fn check_magic(
        &self,
        _checker: &dyn Fn(&MagicValue) -> bool,
        _stream: &mut dyn Stream,
        _reader: Option<&mut ReusableReader>,
        _unfixed_len: bool,
    ) -> SerialResult<bool> {
        Ok(true)
    }
}
