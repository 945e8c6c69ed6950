//! Bot state crate: key/value storage and scoped, typed state on top of it.
//!
//! ## Types
//!
//! - [`StateError`] – State error types
//! - [`Storage`] – Storage trait
//! - [`MemoryStorage`] – process-local storage
//! - [`SqliteStorage`] – SQLite storage (sqlx)
//! - [`BotState`] – conversation / user scope, turn cache, save_changes
//! - [`StatePropertyAccessor`] – typed property access
//! - [`AutoSaveStateMiddleware`] – saves state after each turn

mod accessor;
mod auto_save;
mod bot_state;
mod error;
mod memory_storage;
mod sqlite_pool;
mod sqlite_storage;
mod storage;

pub use accessor::StatePropertyAccessor;
pub use auto_save::AutoSaveStateMiddleware;
pub use bot_state::{BotState, StateScope};
pub use error::StateError;
pub use memory_storage::MemoryStorage;
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_storage::SqliteStorage;
pub use storage::{Storage, StoreItems};
