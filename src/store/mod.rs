//! Watch configuration storage.
//!
//! The in-memory watch store is the runtime source of truth; a narrow
//! persistence adapter mirrors it to Postgres when a database is
//! configured.

pub mod persist;
pub mod watch;

pub use persist::{NoopPersistence, Persistence, PersistedEntry, PostgresPersistence};
pub use watch::{WatchEntry, WatchStore};
