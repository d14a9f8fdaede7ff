//!  Storage is organized around a [kv_store::KeyValueStore].
//!  The basic idea is:
//!   - The whole session history lives under a single key as a JSON array.
//!   - Every save overwrites that key completely.
//!   - A csv mirror is regenerated from the same list after each save. It is never read back.

pub mod csv;
pub mod entities;
pub mod kv_store;
pub mod session_store;
