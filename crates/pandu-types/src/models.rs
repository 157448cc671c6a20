use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role levels, ordered: member < moderator < admin.
/// The derived `Ord` follows variant order, so `role >= Role::Moderator`
/// is the staff check used throughout the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "member" => Some(Role::Member),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cash flow direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            _ => None,
        }
    }
}

/// A registered member. The password hash never leaves the DB layer,
/// so it is absent here on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub handle: String,
    pub display_name: String,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub class: Option<String>,
    pub whatsapp: Option<String>,
    pub role: Role,
    pub is_root: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only cash ledger entry. Entries are never mutated or deleted;
/// the balance is always derived by summing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub direction: Direction,
    pub amount: i64,
    pub memo: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub member_id: i64,
    pub display_name: String,
    /// Calendar day in the portal timezone, the unit of the
    /// one-check-in-per-day rule.
    pub day: NaiveDate,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub member_id: i64,
    pub display_name: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

/// Organizational structure listing (chairperson, secretary, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub division: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaEntry {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub scheduled_for: NaiveDate,
}

/// The calendar day of `now` in the portal's fixed-offset timezone.
pub fn local_day(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_order() {
        assert!(Role::Member < Role::Moderator);
        assert!(Role::Moderator < Role::Admin);
        assert!(Role::Admin >= Role::Moderator);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Member, Role::Moderator, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn local_day_shifts_across_midnight() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        // 2026-01-10 19:30 UTC is already 2026-01-11 02:30 in WIB.
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 19, 30, 0).unwrap();
        assert_eq!(
            local_day(now, wib),
            NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()
        );

        let earlier = Utc.with_ymd_and_hms(2026, 1, 10, 1, 0, 0).unwrap();
        assert_eq!(
            local_day(earlier, wib),
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
        );
    }
}
