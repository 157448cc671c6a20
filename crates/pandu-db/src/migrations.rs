use rusqlite::Connection;
use tracing::info;

use crate::StoreError;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS members (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            handle          TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            display_name    TEXT NOT NULL,
            email           TEXT,
            student_id      TEXT,
            class           TEXT,
            whatsapp        TEXT,
            role            TEXT NOT NULL DEFAULT 'member',
            is_root         INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ledger (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            direction   TEXT NOT NULL CHECK (direction IN ('in', 'out')),
            amount      INTEGER NOT NULL CHECK (amount > 0),
            memo        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS attendance (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            member_id       INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            display_name    TEXT NOT NULL,
            day             TEXT NOT NULL,
            checked_in_at   TEXT NOT NULL,
            UNIQUE (member_id, day)
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_time
            ON attendance(checked_in_at);

        CREATE TABLE IF NOT EXISTS reports (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            member_id       INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            display_name    TEXT NOT NULL,
            message         TEXT NOT NULL,
            submitted_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reports_member
            ON reports(member_id);

        CREATE TABLE IF NOT EXISTS directory (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            position    TEXT NOT NULL,
            division    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS agenda (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            title           TEXT NOT NULL,
            location        TEXT NOT NULL,
            scheduled_for   TEXT NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
