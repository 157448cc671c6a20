//! Database row types — these map directly to SQLite rows.
//! Distinct from the pandu-types API models so the DB layer stays
//! independent of serialization concerns.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pandu_types::models::{
    AgendaEntry, AttendanceRecord, Direction, DirectoryEntry, LedgerEntry, Member, Report, Role,
};
use tracing::warn;

pub struct MemberRow {
    pub id: i64,
    pub handle: String,
    pub password: String,
    pub display_name: String,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub class: Option<String>,
    pub whatsapp: Option<String>,
    pub role: String,
    pub is_root: bool,
    pub created_at: String,
}

pub struct LedgerRow {
    pub id: i64,
    pub direction: String,
    pub amount: i64,
    pub memo: String,
    pub created_at: String,
}

pub struct AttendanceRow {
    pub id: i64,
    pub member_id: i64,
    pub display_name: String,
    pub day: String,
    pub checked_in_at: String,
}

pub struct ReportRow {
    pub id: i64,
    pub member_id: i64,
    pub display_name: String,
    pub message: String,
    pub submitted_at: String,
}

impl MemberRow {
    pub fn into_member(self) -> Member {
        Member {
            id: self.id,
            handle: self.handle,
            display_name: self.display_name,
            email: self.email,
            student_id: self.student_id,
            class: self.class,
            whatsapp: self.whatsapp,
            role: parse_role(&self.role, self.id),
            is_root: self.is_root,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

impl LedgerRow {
    pub fn into_entry(self) -> LedgerEntry {
        let direction = Direction::parse(&self.direction).unwrap_or_else(|| {
            warn!("Corrupt direction '{}' on ledger row {}", self.direction, self.id);
            Direction::In
        });
        LedgerEntry {
            id: self.id,
            direction,
            amount: self.amount,
            memo: self.memo,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

impl AttendanceRow {
    pub fn into_record(self) -> AttendanceRecord {
        let day = self.day.parse::<NaiveDate>().unwrap_or_else(|e| {
            warn!("Corrupt day '{}' on attendance row {}: {}", self.day, self.id, e);
            NaiveDate::default()
        });
        AttendanceRecord {
            id: self.id,
            member_id: self.member_id,
            display_name: self.display_name,
            day,
            checked_in_at: parse_timestamp(&self.checked_in_at),
        }
    }
}

impl ReportRow {
    pub fn into_report(self) -> Report {
        Report {
            id: self.id,
            member_id: self.member_id,
            display_name: self.display_name,
            message: self.message,
            submitted_at: parse_timestamp(&self.submitted_at),
        }
    }
}

pub(crate) fn into_directory_entry(id: i64, name: String, position: String, division: String) -> DirectoryEntry {
    DirectoryEntry { id, name, position, division }
}

pub(crate) fn into_agenda_entry(id: i64, title: String, location: String, scheduled_for: String) -> AgendaEntry {
    let date = scheduled_for.parse::<NaiveDate>().unwrap_or_else(|e| {
        warn!("Corrupt scheduled_for '{}' on agenda row {}: {}", scheduled_for, id, e);
        NaiveDate::default()
    });
    AgendaEntry { id, title, location, scheduled_for: date }
}

fn parse_role(raw: &str, member_id: i64) -> Role {
    Role::parse(raw).unwrap_or_else(|| {
        warn!("Corrupt role '{}' on member {}", raw, member_id);
        Role::Member
    })
}

/// Timestamps are written by this crate as RFC 3339, but tolerate the bare
/// SQLite "YYYY-MM-DD HH:MM:SS" form (treated as UTC) for rows created by
/// earlier tooling.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}
