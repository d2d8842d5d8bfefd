pub mod admins;
pub mod audit_logs;
