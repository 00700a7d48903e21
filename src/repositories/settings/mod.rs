pub mod config_repo;

pub use config_repo::SystemConfigRepository;
