pub mod error;
pub use error::Result;
pub use error::Error;
pub use error::InitFailure;

pub mod config;
pub use config::Config;

pub mod cancellation;
pub use cancellation::CancellationToken;

pub mod filesystem;

pub mod package;
pub use package::PackageName;

pub mod discovery;
pub mod dedupe;

pub mod snapshot;
pub use snapshot::Snapshot;

pub mod build_plan;
pub mod resolver;

pub mod project_config;
pub use project_config::ProjectConfigDraft;

pub mod init;
pub use init::{InitOptions, ProjectResolverBuilder, resolve_project};
