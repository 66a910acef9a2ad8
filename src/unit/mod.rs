pub mod null;    pub use null::*;
pub mod parent;  pub use parent::*;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::error::{BodyResult, SerialResult, SerializationError};
use crate::extra::{ExtraData, NullExtraData};
use crate::magic::MagicValue;
use crate::requirements::{Requirements, SerializationRequirements, UnitView};
use crate::stream::{ReusableReader, ReusableWriter, Stream};

/// An owned handle to a serializable unit.
///
/// Doubles as the opaque version specifier a read returns and a write
/// accepts: the specifier is itself a unit, and this crate passes it through
/// without interpreting it.
pub type UnitHandle = Arc<dyn Serializable>;

/// Trims the module path off `std::any::type_name`, leaving the bare type
/// name units usually report as their label.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A unit that can read itself from, and write itself to, a byte stream,
/// and identify itself through a magic probe.
///
/// Implementors supply the byte-level hooks (`read_body`, `write_body`,
/// `read_magic`) plus the unit's facets; the provided `read`, `write` and
/// `check_magic` operations wrap those hooks with the unit's requirements
/// engine. The wrapping is fixed: pre-validate, body, post-validate, in that
/// order, with any rejection aborting the call. A post-validation failure is
/// raised even though the body already ran, so on error the stream must be
/// assumed advanced.
pub trait Serializable {
    /// Short type name used to attribute failures.
    fn type_label(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// The unit's parent; a unit with no assigned parent returns itself,
    /// never an absent reference.
    fn parent(&self) -> &dyn Serializable;

    /// The engine vetting this unit's operations. Defaults to the shared
    /// unconstrained engine.
    fn requirements(&self) -> Arc<dyn Requirements> {
        SerializationRequirements::shared_default()
    }

    /// The unit's side-channel bag. Defaults to the empty bag.
    fn extra_data(&self) -> &dyn ExtraData {
        NullExtraData::instance()
    }

    /// Byte-level read. Returns the version specifier describing which
    /// schema variant was decoded, if the format distinguishes any.
    fn read_body(
        &mut self,
        stream: &mut dyn Stream,
        reader: Option<&mut ReusableReader>,
        unfixed_len: bool,
    ) -> BodyResult<Option<UnitHandle>>;

    /// Byte-level write, optionally steered by a previously obtained
    /// version specifier.
    fn write_body(
        &self,
        stream: &mut dyn Stream,
        writer: Option<&mut ReusableWriter>,
        version_spec: Option<&dyn Serializable>,
        unfixed_len: bool,
    ) -> BodyResult<()>;

    /// Byte-level magic fetch backing `check_magic`.
    fn read_magic(
        &self,
        stream: &mut dyn Stream,
        reader: Option<&mut ReusableReader>,
        unfixed_len: bool,
    ) -> BodyResult<MagicValue>;

    /// The unit facets validation hooks may consult.
    fn unit_view(&self) -> UnitView<'_> {
        UnitView {
            label:      self.type_label(),
            parent:     self.parent(),
            extra_data: self.extra_data(),
        }
    }

    /// Reads one logical unit from `stream`, wrapped by the unit's
    /// requirements engine.
    fn read(
        &mut self,
        stream: &mut dyn Stream,
        mut reader: Option<&mut ReusableReader>,
        unfixed_len: bool,
    ) -> SerialResult<Option<UnitHandle>> {
        trace!("reading unit {}", self.type_label());
        let requirements = self.requirements();
        if let Err(error) =
            requirements.pre_validate_read(self.unit_view(), Some(&*stream), reader.as_deref(), unfixed_len)
        {
            debug!("{} rejected before its read body ran: {error}", self.type_label());
            return Err(error);
        }
        let version_spec = match self.read_body(&mut *stream, reader.as_deref_mut(), unfixed_len) {
            Ok(spec) => spec,
            Err(cause) => {
                debug!("{} read body failed: {cause}", self.type_label());
                return Err(SerializationError::read(self.type_label()).with_cause(cause));
            }
        };
        if let Err(error) = requirements.post_validate_read(
            self.unit_view(),
            Some(&*stream),
            reader.as_deref(),
            unfixed_len,
            version_spec.as_deref(),
        ) {
            debug!("{} rejected after its read body ran: {error}", self.type_label());
            return Err(error);
        }
        Ok(version_spec)
    }

    /// Writes one logical unit to `stream`, wrapped by the unit's
    /// requirements engine.
    fn write(
        &self,
        stream: &mut dyn Stream,
        mut writer: Option<&mut ReusableWriter>,
        version_spec: Option<&dyn Serializable>,
        unfixed_len: bool,
    ) -> SerialResult<()> {
        trace!("writing unit {}", self.type_label());
        let requirements = self.requirements();
        if let Err(error) = requirements.pre_validate_write(
            self.unit_view(),
            Some(&*stream),
            writer.as_deref(),
            version_spec,
            unfixed_len,
        ) {
            debug!("{} rejected before its write body ran: {error}", self.type_label());
            return Err(error);
        }
        if let Err(cause) = self.write_body(&mut *stream, writer.as_deref_mut(), version_spec, unfixed_len) {
            debug!("{} write body failed: {cause}", self.type_label());
            return Err(SerializationError::write(self.type_label()).with_cause(cause));
        }
        if let Err(error) = requirements.post_validate_write(
            self.unit_view(),
            Some(&*stream),
            writer.as_deref(),
            version_spec,
            unfixed_len,
        ) {
            debug!("{} rejected after its write body ran: {error}", self.type_label());
            return Err(error);
        }
        Ok(())
    }

    /// Fetches the unit's magic value and tests it against `checker`,
    /// without committing to a full read.
    fn check_magic(
        &self,
        checker: &dyn Fn(&MagicValue) -> bool,
        stream: &mut dyn Stream,
        mut reader: Option<&mut ReusableReader>,
        unfixed_len: bool,
    ) -> SerialResult<bool> {
        trace!("probing magic for unit {}", self.type_label());
        let requirements = self.requirements();
        if let Err(error) = requirements.pre_validate_check_magic(
            self.unit_view(),
            Some(&*stream),
            reader.as_deref(),
            unfixed_len,
        ) {
            debug!("{} rejected before its magic was fetched: {error}", self.type_label());
            return Err(error);
        }
        let magic = match self.read_magic(&mut *stream, reader.as_deref_mut(), unfixed_len) {
            Ok(magic) => magic,
            Err(cause) => {
                debug!("{} magic fetch failed: {cause}", self.type_label());
                return Err(SerializationError::read(self.type_label()).with_cause(cause));
            }
        };
        let accepted = checker(&magic);
        requirements.post_validate_check_magic(
            self.unit_view(),
            Some(&*stream),
            reader.as_deref(),
            unfixed_len,
        )?;
        Ok(accepted)
    }
}

impl fmt::Debug for dyn Serializable + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_label())
    }
}
