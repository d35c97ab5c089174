pub mod cache;
pub mod git;
pub mod manifest;
pub mod reference;
pub mod sync;

pub use cache::{CachedRepo, IdGenerator, RepoCache, UuidGenerator, MANIFEST_FILE};
pub use git::{GitRunner, GitStep, StepOutput, SystemGit};
pub use manifest::{JsonManifestStore, ManifestStore, MemoryManifestStore};
pub use reference::{parse_reference, resolve_reference};
pub use sync::{StepReport, SyncEngine, SyncOutcome, SyncPolicy};
