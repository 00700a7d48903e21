pub mod feedback_service;

pub use feedback_service::FeedbackService;
