//! Encoders for cross-process and in-text transport.
//!
//! # Responsibility
//! - Convert records to/from the sparse tagged wire dictionary.
//! - Carry typed scalars through plain-text fields as markup fragments.
//!
//! # Invariants
//! - `decode(encode(r)) == r` for every codec-participating field.
//! - Unknown wire tags are ignored on decode.

pub mod tag;
pub mod wire;
