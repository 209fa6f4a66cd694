#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AnswerRepository, CatalogRepository, InMemoryRepository, NewAnswer, NewUser,
    ProgressRepository, ProgressUpsert, Storage, StorageError, UserRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
