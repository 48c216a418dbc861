//! SQL schema for the Stammbaum SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

use rusqlite::functions::FunctionFlags;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Parent links reference the same table and are cleared, not cascaded,
-- when the parent row goes away. Nothing here prevents cycles.
CREATE TABLE IF NOT EXISTS persons (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    given_name   TEXT NOT NULL,
    family_name  TEXT NOT NULL,
    birth_date   TEXT,              -- ISO 8601 calendar date or NULL
    sex          INTEGER,           -- 1 = male, 0 = female, NULL = unknown
    father_id    INTEGER REFERENCES persons(id) ON DELETE SET NULL,
    mother_id    INTEGER REFERENCES persons(id) ON DELETE SET NULL,
    created_at   TEXT NOT NULL      -- RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS persons_father_idx ON persons(father_id);
CREATE INDEX IF NOT EXISTS persons_mother_idx ON persons(mother_id);
CREATE INDEX IF NOT EXISTS persons_name_idx   ON persons(family_name, given_name);

PRAGMA user_version = 1;
";

/// Register `fold(text)`, a Unicode lowercase used for case-insensitive name
/// search. SQLite's own `LIKE` and `lower` only fold ASCII.
pub fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "fold",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}
