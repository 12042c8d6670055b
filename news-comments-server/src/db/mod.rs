//! Database layer - connection pool and schema
//!
//! The pool is the only shared resource. It is created lazily here and its
//! reachability is checked by `CommentStore::new` before any traffic is served.

pub mod migrations;
pub mod pool;

pub use pool::create_pool;
