//! DB-compatible (e.g. de/serialisable) types.
//!
//! These are the entities the vote engine works with. They are serialised in a
//! DB-friendly way: IDs live under `_id`, datetimes use MongoDB's own format.

pub mod edition;
pub mod member;
pub mod question;
pub mod vote;
