//! NeuroBreath rewards
//!
//! Turns locally stored breathing and challenge progress into points, badges,
//! coupons and tokens. The engine reads two externally written JSON stores
//! (practice progress and the optional challenge lab), derives everything on
//! each read, and keeps a small wallet ledger of what was earned and spent.
//!
//! ## Stores
//!
//! All state lives behind the [`storage::Storage`] trait:
//!
//! 1. **Memory**: [`storage::MemoryStorage`] for tests and embedding.
//!
//! 2. **Files**: [`storage::FileStorage`] keeps one `<key>.json` per key and
//!    can be watched for changes made by other processes.

pub mod config;
pub mod rewards;
pub mod storage;

pub use rewards::*;
