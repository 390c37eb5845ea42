//! Audit log database migrations - embedded SQL files

/// All audit-log migrations, embedded at compile time.
/// Format: (filename, sql_content)
pub const AUDIT_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_audit_log.sql", include_str!("001_audit_log.sql")),
];
