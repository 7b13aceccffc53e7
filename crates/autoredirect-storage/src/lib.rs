pub mod memory;
pub mod mysql;

pub use autoredirect_core::{ArticleRepository, RedirectRepository, StorageError};
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
