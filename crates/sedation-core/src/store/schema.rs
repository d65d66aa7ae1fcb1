//! SQLite schema definition.

/// Complete database schema for the sedation record store.
///
/// One named slot holds the serialized snapshot; the single-row CHECK
/// keeps it a slot rather than a history.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Record Snapshot (single named slot, replaced wholesale on every save)
-- ============================================================================

CREATE TABLE IF NOT EXISTS record_snapshot (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    payload TEXT NOT NULL,                        -- JSON Snapshot
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
