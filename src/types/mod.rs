//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep identifiers and closed category sets from being confused
//! with arbitrary strings and numbers.

mod category;
mod record_id;
mod registration;

pub use category::{CategoryError, RegistrationType, Status};
pub use record_id::{RecordId, RecordIdError};
pub use registration::{
    FieldMismatch, NewRegistration, Registration, RECORD_VERSION, RESERVED_KEYS,
};
