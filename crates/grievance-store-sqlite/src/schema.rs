//! SQL schema for the Grievance SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS complaints (
    complaint_id     TEXT PRIMARY KEY,
    complainant_name TEXT NOT NULL,
    email            TEXT NOT NULL,   -- lowercased before insert
    phone_number     TEXT NOT NULL,
    title            TEXT NOT NULL,
    description      TEXT NOT NULL,
    category         TEXT NOT NULL DEFAULT 'Low',
    assigned_to      TEXT NOT NULL DEFAULT '',
    status           TEXT NOT NULL DEFAULT 'Open',
    completion_date  TEXT,            -- RFC 3339 UTC; set iff status is terminal
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    CHECK ((status IN ('Resolved', 'Closed - No Resolution'))
           = (completion_date IS NOT NULL))
);

-- Notes are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS resolution_notes (
    complaint_id TEXT    NOT NULL REFERENCES complaints(complaint_id),
    position     INTEGER NOT NULL,   -- 0-based insertion order
    text         TEXT    NOT NULL CHECK (length(trim(text)) > 0),
    author       TEXT    NOT NULL DEFAULT 'Staff',
    created_at   TEXT    NOT NULL,
    PRIMARY KEY (complaint_id, position)
);

CREATE INDEX IF NOT EXISTS complaints_status_idx   ON complaints(status);
CREATE INDEX IF NOT EXISTS complaints_category_idx ON complaints(category);
CREATE INDEX IF NOT EXISTS complaints_created_idx  ON complaints(created_at);

PRAGMA user_version = 1;
";
