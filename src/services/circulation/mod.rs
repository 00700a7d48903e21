pub mod circulation_service;
pub mod fine_service;

pub use circulation_service::CirculationService;
pub use fine_service::FineService;
