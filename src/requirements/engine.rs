use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{RequirementViolation, SerialResult, SerializationError};
use crate::extra::ExtraData;
use crate::stream::{ReusableReader, ReusableWriter, Stream};
use crate::unit::Serializable;

use super::{Requirements, UnitView};

pub type ReaderPredicate      = Arc<dyn Fn(Option<&ReusableReader>) -> bool + Send + Sync>;
pub type WriterPredicate      = Arc<dyn Fn(Option<&ReusableWriter>) -> bool + Send + Sync>;
pub type VersionSpecPredicate = Arc<dyn Fn(Option<&dyn Serializable>) -> bool + Send + Sync>;
pub type ParentPredicate      = Arc<dyn Fn(&dyn Serializable) -> bool + Send + Sync>;
pub type ExtraDataPredicate   = Arc<dyn Fn(&dyn ExtraData) -> bool + Send + Sync>;

const PRE_READ:        &str = "pre-read validation failed";
const POST_READ:       &str = "post-read validation failed";
const PRE_WRITE:       &str = "pre-write validation failed";
const POST_WRITE:      &str = "post-write validation failed";
const PRE_CHECK_MAGIC: &str = "pre-check-magic validation failed";

/// The default requirements engine.
///
/// Construction is plain struct-update over [`Default`]: flags default to
/// unconstrained and every predicate slot to "absent means accept".
///
/// ```
/// use serializable::SerializationRequirements;
///
/// let requirements = SerializationRequirements {
///     read_needs_seek: true,
///     ..Default::default()
/// };
/// # let _ = requirements;
/// ```
///
/// The checks of each hook run in a fixed order, from stream existence and
/// capability through structural invariants to the configured predicates,
/// and stop at the first failure, so the reported violation is always the
/// earliest one. That ordering is observable behavior; do not reshuffle it.
#[derive(Clone, Default)]
pub struct SerializationRequirements {
    pub read_needs_seek:              bool,
    pub write_needs_seek:             bool,
    pub read_supports_unfixed_len:    bool,
    pub write_supports_unfixed_len:   bool,
    pub validate_reusable_reader:     Option<ReaderPredicate>,
    pub validate_reusable_writer:     Option<WriterPredicate>,
    pub validate_version_spec:        Option<VersionSpecPredicate>,
    pub validate_read_parent:         Option<ParentPredicate>,
    pub validate_write_parent:        Option<ParentPredicate>,
    pub pre_read_extra_data:          Option<ExtraDataPredicate>,
    pub post_read_extra_data:         Option<ExtraDataPredicate>,
    pub pre_write_extra_data:         Option<ExtraDataPredicate>,
    pub post_write_extra_data:        Option<ExtraDataPredicate>,
    pub pre_read_parent_extra_data:   Option<ExtraDataPredicate>,
    pub post_read_parent_extra_data:  Option<ExtraDataPredicate>,
    pub pre_write_parent_extra_data:  Option<ExtraDataPredicate>,
    pub post_write_parent_extra_data: Option<ExtraDataPredicate>,
}

impl SerializationRequirements {
    /// The process-wide unconstrained engine every unit falls back to.
    pub fn shared_default() -> Arc<SerializationRequirements> {
        static DEFAULT: OnceLock<Arc<SerializationRequirements>> = OnceLock::new();
        DEFAULT
            .get_or_init(|| Arc::new(SerializationRequirements::default()))
            .clone()
    }

    fn check_read_stream(
        &self,
        stream: Option<&dyn Stream>,
        reader: Option<&ReusableReader>,
        unfixed_len: bool,
    ) -> Result<(), RequirementViolation> {
        let Some(stream) = stream else {
            return Err(RequirementViolation::MissingStream);
        };
        if !stream.can_read() {
            return Err(RequirementViolation::StreamNotReadable);
        }
        if self.read_needs_seek && !stream.can_seek() {
            return Err(RequirementViolation::StreamNotSeekable);
        }
        if let Some(reader) = reader {
            if reader.bound_to() != stream.id() {
                return Err(RequirementViolation::ReaderNotBound {
                    bound:    reader.bound_to(),
                    supplied: stream.id(),
                });
            }
        }
        if let Some(validate) = self.validate_reusable_reader.as_deref() {
            if !validate(reader) {
                return Err(RequirementViolation::ReaderRejected);
            }
        }
        if unfixed_len && !self.read_supports_unfixed_len {
            return Err(RequirementViolation::UnfixedLenReadUnsupported);
        }
        Ok(())
    }

    fn check_write_stream(
        &self,
        stream: Option<&dyn Stream>,
        writer: Option<&ReusableWriter>,
        unfixed_len: bool,
    ) -> Result<(), RequirementViolation> {
        let Some(stream) = stream else {
            return Err(RequirementViolation::MissingStream);
        };
        if !stream.can_write() {
            return Err(RequirementViolation::StreamNotWritable);
        }
        if self.write_needs_seek && !stream.can_seek() {
            return Err(RequirementViolation::StreamNotSeekable);
        }
        if let Some(writer) = writer {
            if writer.bound_to() != stream.id() {
                return Err(RequirementViolation::WriterNotBound {
                    bound:    writer.bound_to(),
                    supplied: stream.id(),
                });
            }
        }
        if let Some(validate) = self.validate_reusable_writer.as_deref() {
            if !validate(writer) {
                return Err(RequirementViolation::WriterRejected);
            }
        }
        if unfixed_len && !self.write_supports_unfixed_len {
            return Err(RequirementViolation::UnfixedLenWriteUnsupported);
        }
        Ok(())
    }

    fn configured_predicates(&self) -> Vec<&'static str> {
        let mut configured = Vec::new();
        let slots: [(&'static str, bool); 13] = [
            ("validate_reusable_reader", self.validate_reusable_reader.is_some()),
            ("validate_reusable_writer", self.validate_reusable_writer.is_some()),
            ("validate_version_spec", self.validate_version_spec.is_some()),
            ("validate_read_parent", self.validate_read_parent.is_some()),
            ("validate_write_parent", self.validate_write_parent.is_some()),
            ("pre_read_extra_data", self.pre_read_extra_data.is_some()),
            ("post_read_extra_data", self.post_read_extra_data.is_some()),
            ("pre_write_extra_data", self.pre_write_extra_data.is_some()),
            ("post_write_extra_data", self.post_write_extra_data.is_some()),
            ("pre_read_parent_extra_data", self.pre_read_parent_extra_data.is_some()),
            ("post_read_parent_extra_data", self.post_read_parent_extra_data.is_some()),
            ("pre_write_parent_extra_data", self.pre_write_parent_extra_data.is_some()),
            ("post_write_parent_extra_data", self.post_write_parent_extra_data.is_some()),
        ];
        for (name, present) in slots {
            if present {
                configured.push(name);
            }
        }
        configured
    }
}

impl fmt::Debug for SerializationRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationRequirements")
            .field("read_needs_seek", &self.read_needs_seek)
            .field("write_needs_seek", &self.write_needs_seek)
            .field("read_supports_unfixed_len", &self.read_supports_unfixed_len)
            .field("write_supports_unfixed_len", &self.write_supports_unfixed_len)
            .field("predicates", &self.configured_predicates())
            .finish()
    }
}

fn reject(
    unit: UnitView<'_>,
    phase: &'static str,
    is_write: bool,
    violation: RequirementViolation,
) -> SerializationError {
    SerializationError::with_direction(unit.label, is_write)
        .with_message(phase)
        .with_cause(violation)
}

impl Requirements for SerializationRequirements {
    fn pre_validate_read(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        reader: Option<&ReusableReader>,
        unfixed_len: bool,
    ) -> SerialResult<()> {
        self.check_read_stream(stream, reader, unfixed_len)
            .map_err(|violation| reject(unit, PRE_READ, false, violation))?;
        if let Some(validate) = self.validate_read_parent.as_deref() {
            if !validate(unit.parent) {
                return Err(reject(unit, PRE_READ, false, RequirementViolation::ParentRejected));
            }
        }
        if let Some(validate) = self.pre_read_extra_data.as_deref() {
            if !validate(unit.extra_data) {
                return Err(reject(unit, PRE_READ, false, RequirementViolation::ExtraDataRejected));
            }
        }
        if let Some(validate) = self.pre_read_parent_extra_data.as_deref() {
            if !validate(unit.parent.extra_data()) {
                return Err(reject(
                    unit,
                    PRE_READ,
                    false,
                    RequirementViolation::ParentExtraDataRejected,
                ));
            }
        }
        Ok(())
    }

    fn post_validate_read(
        &self,
        unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _reader: Option<&ReusableReader>,
        _unfixed_len: bool,
        version_spec: Option<&dyn Serializable>,
    ) -> SerialResult<()> {
        if let Some(validate) = self.validate_version_spec.as_deref() {
            if !validate(version_spec) {
                return Err(reject(
                    unit,
                    POST_READ,
                    false,
                    RequirementViolation::VersionSpecRejected,
                ));
            }
        }
        if let Some(validate) = self.post_read_extra_data.as_deref() {
            if !validate(unit.extra_data) {
                return Err(reject(unit, POST_READ, false, RequirementViolation::ExtraDataRejected));
            }
        }
        if let Some(validate) = self.post_read_parent_extra_data.as_deref() {
            if !validate(unit.parent.extra_data()) {
                return Err(reject(
                    unit,
                    POST_READ,
                    false,
                    RequirementViolation::ParentExtraDataRejected,
                ));
            }
        }
        Ok(())
    }

    fn pre_validate_write(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        writer: Option<&ReusableWriter>,
        version_spec: Option<&dyn Serializable>,
        unfixed_len: bool,
    ) -> SerialResult<()> {
        self.check_write_stream(stream, writer, unfixed_len)
            .map_err(|violation| reject(unit, PRE_WRITE, true, violation))?;
        if let Some(validate) = self.validate_version_spec.as_deref() {
            if !validate(version_spec) {
                return Err(reject(
                    unit,
                    PRE_WRITE,
                    true,
                    RequirementViolation::VersionSpecRejected,
                ));
            }
        }
        if let Some(validate) = self.validate_write_parent.as_deref() {
            if !validate(unit.parent) {
                return Err(reject(unit, PRE_WRITE, true, RequirementViolation::ParentRejected));
            }
        }
        if let Some(validate) = self.pre_write_extra_data.as_deref() {
            if !validate(unit.extra_data) {
                return Err(reject(unit, PRE_WRITE, true, RequirementViolation::ExtraDataRejected));
            }
        }
        if let Some(validate) = self.pre_write_parent_extra_data.as_deref() {
            if !validate(unit.parent.extra_data()) {
                return Err(reject(
                    unit,
                    PRE_WRITE,
                    true,
                    RequirementViolation::ParentExtraDataRejected,
                ));
            }
        }
        Ok(())
    }

    fn post_validate_write(
        &self,
        unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _writer: Option<&ReusableWriter>,
        _version_spec: Option<&dyn Serializable>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        if let Some(validate) = self.post_write_extra_data.as_deref() {
            if !validate(unit.extra_data) {
                return Err(reject(unit, POST_WRITE, true, RequirementViolation::ExtraDataRejected));
            }
        }
        if let Some(validate) = self.post_write_parent_extra_data.as_deref() {
            if !validate(unit.parent.extra_data()) {
                return Err(reject(
                    unit,
                    POST_WRITE,
                    true,
                    RequirementViolation::ParentExtraDataRejected,
                ));
            }
        }
        Ok(())
    }

    fn pre_validate_check_magic(
        &self,
        unit: UnitView<'_>,
        stream: Option<&dyn Stream>,
        reader: Option<&ReusableReader>,
        unfixed_len: bool,
    ) -> SerialResult<()> {
        // A magic probe shares the read-side stream and reader checks but
        // deliberately skips the parent and extra-data predicates.
        self.check_read_stream(stream, reader, unfixed_len)
            .map_err(|violation| reject(unit, PRE_CHECK_MAGIC, false, violation))
    }

    fn post_validate_check_magic(
        &self,
        _unit: UnitView<'_>,
        _stream: Option<&dyn Stream>,
        _reader: Option<&ReusableReader>,
        _unfixed_len: bool,
    ) -> SerialResult<()> {
        // Nothing to enforce after a magic probe today; the hook stays so
        // custom engines can attach one.
        Ok(())
    }
}
