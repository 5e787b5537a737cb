//! SQL schema for the Ballot SQLite store.
//!
//! Executed once at connection startup. There are no migrations; the DDL is
//! idempotent thanks to `CREATE TABLE IF NOT EXISTS`.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS collections (
    name          TEXT PRIMARY KEY,
    partition_key TEXT NOT NULL,   -- JSON path, e.g. '/candidateId'
    created_at    TEXT NOT NULL    -- ISO 8601 UTC
);

-- Documents are append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS documents (
    collection    TEXT NOT NULL REFERENCES collections(name),
    id            TEXT NOT NULL,
    partition_key TEXT NOT NULL,   -- value of the partition key field
    body_json     TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS documents_partition_idx
    ON documents(collection, partition_key);

PRAGMA user_version = 1;
";
