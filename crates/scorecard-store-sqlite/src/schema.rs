//! SQL schema for the Scorecard SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sessions (
    session_id    TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL UNIQUE,
    description   TEXT,
    last_modified TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chains (
    chain_id   TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    session_id TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    file_name  TEXT NOT NULL,
    -- Re-selecting an attached file must be a no-op even when two requests
    -- race past the service-level dedup check.
    UNIQUE (session_id, file_name)
);

CREATE TABLE IF NOT EXISTS questions (
    question_id     TEXT PRIMARY KEY,
    created_at      TEXT NOT NULL,
    session_id      TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    question_text   TEXT NOT NULL,
    expected_answer TEXT,
    last_modified   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS configurations (
    configuration_id TEXT PRIMARY KEY,
    created_at       TEXT NOT NULL,
    session_id       TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    chain_id         TEXT NOT NULL REFERENCES chains(chain_id) ON DELETE CASCADE,
    config_schema    TEXT,   -- JSON
    config_values    TEXT    -- JSON
);

CREATE TABLE IF NOT EXISTS answers (
    answer_id        TEXT PRIMARY KEY,
    created_at       TEXT NOT NULL,
    chain_id         TEXT NOT NULL REFERENCES chains(chain_id) ON DELETE CASCADE,
    question_id      TEXT NOT NULL REFERENCES questions(question_id) ON DELETE CASCADE,
    configuration_id TEXT NOT NULL REFERENCES configurations(configuration_id) ON DELETE CASCADE,
    generated_answer TEXT NOT NULL,
    score            INTEGER CHECK (score BETWEEN 0 AND 5)
);

CREATE TABLE IF NOT EXISTS answer_comments (
    comment_id    TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    answer_id     TEXT NOT NULL REFERENCES answers(answer_id) ON DELETE CASCADE,
    comment_text  TEXT NOT NULL,
    last_modified TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS chains_session_idx         ON chains(session_id);
CREATE INDEX IF NOT EXISTS questions_session_idx      ON questions(session_id);
CREATE INDEX IF NOT EXISTS configurations_session_idx ON configurations(session_id);
CREATE INDEX IF NOT EXISTS configurations_chain_idx   ON configurations(chain_id);
CREATE INDEX IF NOT EXISTS answers_question_idx       ON answers(question_id);
CREATE INDEX IF NOT EXISTS answers_configuration_idx  ON answers(configuration_id);
CREATE INDEX IF NOT EXISTS answers_chain_idx          ON answers(chain_id);
CREATE INDEX IF NOT EXISTS comments_answer_idx        ON answer_comments(answer_id);

PRAGMA user_version = 1;
";
