use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::error::{StoreError, is_foreign_key_violation, is_unique_violation};
use crate::models::{
    AttendanceRow, LedgerRow, MemberRow, ReportRow, into_agenda_entry, into_directory_entry,
};
use pandu_types::models::{AgendaEntry, DirectoryEntry};

/// Fields of a member being registered. The password is already hashed by
/// the caller; this layer never sees plaintext credentials.
pub struct NewMember<'a> {
    pub handle: &'a str,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub email: Option<&'a str>,
    pub student_id: Option<&'a str>,
    pub class: Option<&'a str>,
    pub whatsapp: Option<&'a str>,
}

pub struct ProfileUpdate<'a> {
    pub display_name: &'a str,
    pub email: Option<&'a str>,
    pub student_id: Option<&'a str>,
    pub class: Option<&'a str>,
    pub whatsapp: Option<&'a str>,
}

impl Database {
    // -- Members --

    /// Seed the distinguished root admin if it does not exist yet.
    /// Idempotent across restarts; never overwrites an existing record.
    pub fn ensure_root_admin(
        &self,
        handle: &str,
        password_hash: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO members (handle, password, display_name, role, is_root, created_at)
                 VALUES (?1, ?2, ?3, 'admin', 1, ?4)
                 ON CONFLICT(handle) DO NOTHING",
                params![handle, password_hash, display_name, now.to_rfc3339()],
            )?;
            Ok(())
        })
    }

    pub fn create_member(&self, new: &NewMember, now: DateTime<Utc>) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO members
                     (handle, password, display_name, email, student_id, class, whatsapp, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.handle,
                    new.password_hash,
                    new.display_name,
                    new.email,
                    new.student_id,
                    new.class,
                    new.whatsapp,
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateHandle
                } else {
                    e.into()
                }
            })?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn member_by_handle(&self, handle: &str) -> Result<Option<MemberRow>, StoreError> {
        self.with_conn(|conn| query_member(conn, "handle = ?1", &[&handle]))
    }

    pub fn member_by_id(&self, id: i64) -> Result<Option<MemberRow>, StoreError> {
        self.with_conn(|conn| query_member(conn, "id = ?1", &[&id]))
    }

    pub fn list_members(&self) -> Result<Vec<MemberRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {MEMBER_COLS} FROM members ORDER BY id"))?;
            let rows = stmt
                .query_map([], member_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE members
                 SET display_name = ?1, email = ?2, student_id = ?3, class = ?4, whatsapp = ?5
                 WHERE id = ?6",
                params![
                    update.display_name,
                    update.email,
                    update.student_id,
                    update.class,
                    update.whatsapp,
                    id,
                ],
            )?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    /// Change a member's role. Refuses to touch the root admin.
    pub fn set_member_role(&self, id: i64, role: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            match root_flag(conn, id)? {
                None => Err(StoreError::NotFound),
                Some(true) => Err(StoreError::RootAdmin),
                Some(false) => {
                    conn.execute("UPDATE members SET role = ?1 WHERE id = ?2", params![role, id])?;
                    Ok(())
                }
            }
        })
    }

    /// Delete a member. Attendance and reports cascade; ledger entries carry
    /// no member reference and are unaffected. Refuses the root admin.
    pub fn delete_member(&self, id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            match root_flag(conn, id)? {
                None => Err(StoreError::NotFound),
                Some(true) => Err(StoreError::RootAdmin),
                Some(false) => {
                    conn.execute("DELETE FROM members WHERE id = ?1", [id])?;
                    Ok(())
                }
            }
        })
    }

    // -- Ledger --

    pub fn insert_ledger_entry(
        &self,
        direction: &str,
        amount: i64,
        memo: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ledger (direction, amount, memo, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![direction, amount, memo, now.to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_ledger_entries(&self) -> Result<Vec<LedgerRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, direction, amount, memo, created_at
                 FROM ledger ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(LedgerRow {
                        id: row.get(0)?,
                        direction: row.get(1)?,
                        amount: row.get(2)?,
                        memo: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// (income, expense) partial sums over the whole ledger.
    pub fn ledger_totals(&self) -> Result<(i64, i64), StoreError> {
        self.with_conn(|conn| {
            let totals = conn.query_row(
                "SELECT
                     COALESCE(SUM(CASE WHEN direction = 'in' THEN amount END), 0),
                     COALESCE(SUM(CASE WHEN direction = 'out' THEN amount END), 0)
                 FROM ledger",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(totals)
        })
    }

    // -- Attendance --

    /// Append a check-in for (member, day). The UNIQUE(member_id, day)
    /// constraint makes a second same-day check-in fail atomically, so
    /// concurrent requests cannot slip in a duplicate.
    pub fn insert_attendance(
        &self,
        member_id: i64,
        display_name: &str,
        day: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO attendance (member_id, display_name, day, checked_in_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![member_id, display_name, day, now.to_rfc3339()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::AlreadyCheckedIn
                } else if is_foreign_key_violation(&e) {
                    // A stale token for a deleted member, not a duplicate day.
                    StoreError::NotFound
                } else {
                    e.into()
                }
            })?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_attendance(&self, limit: u32) -> Result<Vec<AttendanceRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, member_id, display_name, day, checked_in_at
                 FROM attendance ORDER BY checked_in_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], |row| {
                    Ok(AttendanceRow {
                        id: row.get(0)?,
                        member_id: row.get(1)?,
                        display_name: row.get(2)?,
                        day: row.get(3)?,
                        checked_in_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Reports --

    pub fn insert_report(
        &self,
        member_id: i64,
        display_name: &str,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reports (member_id, display_name, message, submitted_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![member_id, display_name, message, now.to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_reports(&self) -> Result<Vec<ReportRow>, StoreError> {
        self.with_conn(|conn| query_reports(conn, None))
    }

    pub fn list_reports_for(&self, member_id: i64) -> Result<Vec<ReportRow>, StoreError> {
        self.with_conn(|conn| query_reports(conn, Some(member_id)))
    }

    /// Resolving a report deletes it; there is no intermediate state.
    pub fn delete_report(&self, id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM reports WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    // -- Directory / agenda --

    pub fn insert_directory_entry(
        &self,
        name: &str,
        position: &str,
        division: &str,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO directory (name, position, division) VALUES (?1, ?2, ?3)",
                params![name, position, division],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_directory(&self) -> Result<Vec<DirectoryEntry>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, position, division FROM directory ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(into_directory_entry(
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_directory_entry(&self, id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM directory WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    pub fn insert_agenda_entry(
        &self,
        title: &str,
        location: &str,
        scheduled_for: &str,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO agenda (title, location, scheduled_for) VALUES (?1, ?2, ?3)",
                params![title, location, scheduled_for],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_agenda(&self) -> Result<Vec<AgendaEntry>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, location, scheduled_for FROM agenda ORDER BY scheduled_for",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(into_agenda_entry(
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_agenda_entry(&self, id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM agenda WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }
}

const MEMBER_COLS: &str =
    "id, handle, password, display_name, email, student_id, class, whatsapp, role, is_root, created_at";

fn member_from_row(row: &rusqlite::Row) -> Result<MemberRow, rusqlite::Error> {
    Ok(MemberRow {
        id: row.get(0)?,
        handle: row.get(1)?,
        password: row.get(2)?,
        display_name: row.get(3)?,
        email: row.get(4)?,
        student_id: row.get(5)?,
        class: row.get(6)?,
        whatsapp: row.get(7)?,
        role: row.get(8)?,
        is_root: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn query_member(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Option<MemberRow>, StoreError> {
    let sql = format!("SELECT {MEMBER_COLS} FROM members WHERE {filter}");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row(params, member_from_row).optional()?;
    Ok(row)
}

/// The `is_root` flag for a member, or `None` if no such member exists.
fn root_flag(conn: &Connection, id: i64) -> Result<Option<bool>, StoreError> {
    let flag = conn
        .query_row("SELECT is_root FROM members WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(flag)
}

fn query_reports(conn: &Connection, member_id: Option<i64>) -> Result<Vec<ReportRow>, StoreError> {
    let mut sql = String::from(
        "SELECT id, member_id, display_name, message, submitted_at FROM reports",
    );
    if member_id.is_some() {
        sql.push_str(" WHERE member_id = ?1");
    }
    sql.push_str(" ORDER BY submitted_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let map = |row: &rusqlite::Row| {
        Ok(ReportRow {
            id: row.get(0)?,
            member_id: row.get(1)?,
            display_name: row.get(2)?,
            message: row.get(3)?,
            submitted_at: row.get(4)?,
        })
    };
    let rows = match member_id {
        Some(id) => stmt.query_map([id], map)?.collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}
