pub mod config_service;
pub mod dto;
pub mod image_loader;
pub mod paths;
pub mod secret_service;
pub mod session_snapshot_repository;

pub use crate::config_service::ConfigService;
pub use crate::paths::AetherPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::session_snapshot_repository::FileSessionSnapshotRepository;
