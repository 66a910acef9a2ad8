//! Validation-wrapped binary serialization.
//!
//! Every serializable unit pairs its byte-level read/write/check-magic
//! hooks with a pluggable requirements engine that vets each call before
//! and after the bytes move. The crate ships the contract ([`Serializable`],
//! [`Requirements`]), the configurable default engine with its ordered
//! built-in checks, null variants of every collaborator so placeholder
//! slots never need null-checks, and the stream plumbing the checks are
//! expressed against.
//!
//! Concrete encodings stay out of scope: implementors supply the body hooks
//! and this crate guarantees the wrapping around them.

pub mod error;         pub use error::*;
pub mod extra;         pub use extra::*;
pub mod label;         pub use label::*;
pub mod magic;         pub use magic::*;
pub mod requirements;  pub use requirements::*;
pub mod stream;        pub use stream::*;
pub mod unit;          pub use unit::*;
