pub mod diff;
pub mod refs;
pub mod repository;
pub mod types;

pub use diff::DiffEngine;
pub use refs::list_refs;
pub use repository::RepoCache;
