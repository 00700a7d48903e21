pub mod feedback;

pub use feedback::{Feedback, FeedbackStatus};
