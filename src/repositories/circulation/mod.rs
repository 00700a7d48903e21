pub mod transaction_repo;

pub use transaction_repo::{LoanClosure, TransactionRepository, unpaid_fine_filter};
