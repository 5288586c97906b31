//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - Field names are camelCase.
//! - Datetimes are RFC 3339 strings.
//! - Internal bookkeeping (legacy fields, storage-only flags) is left out.

pub mod caller;
pub mod edition;
pub mod member;
pub mod question;
pub mod results;
pub mod session;
pub mod vote;
