//! Parameter identity and metadata for sifter.
//!
//! - [`ParameterId`]: a stable identity for "the attribute named X", whether
//!   X is a built-in code, a GUID, a numeric key or a plain name. Equality
//!   and hashing use the derived stable form, so identifiers reached through
//!   different paths agree.
//! - [`ParameterMetadata`]: which categories carry a parameter and whether it
//!   lives on instances or types, with its flat JSON persisted form.
//! - [`ByteStore`]: the injected text store the metadata cache persists to,
//!   with [`FsByteStore`] and [`MemoryByteStore`] implementations.
//!
//! ```rust
//! use sifter_params::ParameterId;
//!
//! let a: ParameterId = "-1001;Mark".parse().unwrap();
//! let b: ParameterId = a.to_string().parse().unwrap();
//! assert_eq!(a, b);
//! ```

mod bytestore;
mod error;
mod identifier;
pub mod metadata;

pub use bytestore::{ByteStore, FsByteStore, MemoryByteStore};
pub use error::{ParamError, Result};
pub use identifier::ParameterId;
pub use metadata::{MetadataRecord, ParameterMetadata};
