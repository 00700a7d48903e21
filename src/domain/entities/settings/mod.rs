pub mod system_config;

pub use system_config::SystemConfig;
