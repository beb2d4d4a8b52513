//! Infrastructure layer: storage adapters, channel collaborators, workers.

pub mod collaborators;
pub mod memory;
pub mod nudge;
pub mod postgres;
pub mod repos;

pub use collaborators::{FixedTranscriber, KeywordClassifier, RecordingSender, TracingSender};
pub use memory::InMemoryStore;
pub use nudge::{spawn_dispatcher, spawn_khata_sweep, NudgeHandle};
pub use postgres::PgStore;
pub use repos::{
    CatalogRepo, Datastore, DirectoryRepo, InventoryRepo, LedgerRepo, ReorderRepo, RepoError,
    RepoResult, SignalRepo,
};
