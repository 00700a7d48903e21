pub mod audit_repo;

pub use audit_repo::AuditLogRepository;
