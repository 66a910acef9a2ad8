use thiserror::Error;

use crate::stream::StreamId;

/// Result alias for the wrapped read/write/check-magic operations.
pub type SerialResult<T> = Result<T, SerializationError>;

/// Error type surfaced by the abstract body hooks of a concrete unit.
pub type BodyError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for the abstract body hooks.
pub type BodyResult<T> = Result<T, BodyError>;

/// A single violated built-in requirement.
///
/// The default engine evaluates its checks in a fixed order and stops at the
/// first failure, so the variant carried by a [`SerializationError`] names
/// the earliest invariant the call broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequirementViolation {
    #[error("no stream was supplied")]
    MissingStream,
    #[error("the supplied stream does not support reading")]
    StreamNotReadable,
    #[error("the supplied stream does not support writing")]
    StreamNotWritable,
    #[error("the supplied stream does not support seeking")]
    StreamNotSeekable,
    #[error("the reusable reader is bound to stream {bound}, not the supplied stream {supplied}")]
    ReaderNotBound { bound: StreamId, supplied: StreamId },
    #[error("the reusable writer is bound to stream {bound}, not the supplied stream {supplied}")]
    WriterNotBound { bound: StreamId, supplied: StreamId },
    #[error("the reusable reader was rejected by the configured validator")]
    ReaderRejected,
    #[error("the reusable writer was rejected by the configured validator")]
    WriterRejected,
    #[error("this unit does not read indeterminate-length data")]
    UnfixedLenReadUnsupported,
    #[error("this unit does not write indeterminate-length data")]
    UnfixedLenWriteUnsupported,
    #[error("the version specifier was rejected by the configured validator")]
    VersionSpecRejected,
    #[error("the parent unit was rejected by the configured validator")]
    ParentRejected,
    #[error("the unit's extra data was rejected by the configured validator")]
    ExtraDataRejected,
    #[error("the parent's extra data was rejected by the configured validator")]
    ParentExtraDataRejected,
}

/// The single error kind raised by wrapped serialization operations.
///
/// Carries the failing unit's type label, the direction of travel (a magic
/// check counts as a read), an optional phase message and the underlying
/// cause, which for built-in checks is a [`RequirementViolation`].
#[derive(Debug, Error)]
#[error("Failed to {} type \"{}\"{}", direction_word(.is_write), .unit_type, message_suffix(.message))]
pub struct SerializationError {
    unit_type: &'static str,
    message:   Option<String>,
    is_write:  bool,
    #[source]
    source:    Option<BodyError>,
}

impl SerializationError {
    /// A read-direction failure for the named unit type.
    pub fn read(unit_type: &'static str) -> SerializationError {
        SerializationError::with_direction(unit_type, false)
    }

    /// A write-direction failure for the named unit type.
    pub fn write(unit_type: &'static str) -> SerializationError {
        SerializationError::with_direction(unit_type, true)
    }

    pub fn with_direction(unit_type: &'static str, is_write: bool) -> SerializationError {
        SerializationError { unit_type, message: None, is_write, source: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> SerializationError {
        self.message = Some(message.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<BodyError>) -> SerializationError {
        self.source = Some(cause.into());
        self
    }

    /// Type label of the unit whose operation failed.
    pub fn unit_type(&self) -> &'static str {
        self.unit_type
    }

    /// True for write-path failures; read and check-magic failures are false.
    pub fn is_write(&self) -> bool {
        self.is_write
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The violated built-in requirement, when the cause is one.
    pub fn violation(&self) -> Option<&RequirementViolation> {
        self.source
            .as_ref()
            .and_then(|cause| cause.downcast_ref::<RequirementViolation>())
    }
}

fn direction_word(is_write: &bool) -> &'static str {
    if *is_write {
        "serialize"
    } else {
        "deserialize"
    }
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(text) if !text.is_empty() => format!(": {text}"),
        _ => String::new(),
    }
}
