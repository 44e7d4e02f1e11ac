//! `SQLite` schema definitions for the profile store.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the profiles table.
///
/// `document` holds the full JSON record; `user_id` and `public_url` are
/// copied out of it so they can be indexed. Neither is unique.
pub const CREATE_PROFILES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    public_url TEXT NOT NULL,
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    stored_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on `user_id` for owner lookups.
pub const CREATE_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_profiles_user ON profiles(user_id)
";

/// SQL statement to create an index on `public_url` for public resolution.
pub const CREATE_PUBLIC_URL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_profiles_public_url ON profiles(public_url)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PROFILES_TABLE,
    CREATE_USER_INDEX,
    CREATE_PUBLIC_URL_INDEX,
    CREATE_METADATA_TABLE,
];
