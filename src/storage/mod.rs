//! Persistence for users, templates, recipients and send history.
//!
//! Two interchangeable backends implement [`StorageBackend`]:
//! - [`MemoryStorage`]: DashMap-backed, lost on restart
//! - [`PostgresStorage`]: sqlx over a `PgPool` with embedded migrations

mod backend;
mod factory;
mod memory_backend;
mod pool;
mod postgres_backend;

pub use backend::{
    EmailLogStore, RecipientStore, StorageBackend, StorageError, StorageResult, TemplateStore,
    UserStore,
};
pub use factory::create_storage_backend;
pub use memory_backend::MemoryStorage;
pub use pool::PostgresPool;
pub use postgres_backend::PostgresStorage;
