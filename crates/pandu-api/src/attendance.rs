use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use pandu_types::api::Claims;
use pandu_types::models::{AttendanceRecord, local_day};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttendanceQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_attendance(query.limit.min(200))?;
    let records: Vec<AttendanceRecord> = rows.into_iter().map(|r| r.into_record()).collect();
    Ok(Json(records))
}

pub async fn check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let record = check_in_at(&state, &claims, Utc::now())?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// One check-in per member per calendar day in the portal timezone. The
/// day is derived from `now`, and the store's uniqueness constraint decides
/// duplicates atomically.
pub fn check_in_at(
    state: &AppState,
    claims: &Claims,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, ApiError> {
    let day = local_day(now, state.tz_offset);
    let id = state
        .db
        .insert_attendance(claims.sub, &claims.display_name, &day.to_string(), now)?;

    Ok(AttendanceRecord {
        id,
        member_id: claims.sub,
        display_name: claims.display_name.clone(),
        day,
        checked_in_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{FixedOffset, TimeZone};
    use pandu_db::Database;
    use pandu_db::queries::NewMember;
    use pandu_types::models::Role;

    use crate::state::AppStateInner;

    fn wib_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
            tz_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
            ledger_write_role: Role::Admin,
        })
    }

    fn claims_for(id: i64) -> Claims {
        Claims {
            sub: id,
            handle: "budi".into(),
            display_name: "Budi Santoso".into(),
            role: Role::Member,
            exp: 0,
        }
    }

    /// 08:00 WIB on a given date, expressed in UTC.
    fn wib_morning(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 1, 0, 0).unwrap()
    }

    #[test]
    fn one_check_in_per_wib_day() {
        let state = wib_state();
        let id = state
            .db
            .create_member(
                &NewMember {
                    handle: "budi",
                    password_hash: "$argon2id$fake",
                    display_name: "Budi Santoso",
                    email: None,
                    student_id: None,
                    class: None,
                    whatsapp: None,
                },
                wib_morning(10),
            )
            .unwrap();
        let claims = claims_for(id);

        // 2026-01-10 08:00 WIB
        let first = check_in_at(&state, &claims, wib_morning(10)).unwrap();
        assert_eq!(first.day.to_string(), "2026-01-10");

        // Same WIB day at 20:00 (13:00 UTC)
        let evening = Utc.with_ymd_and_hms(2026, 1, 10, 13, 0, 0).unwrap();
        assert!(matches!(
            check_in_at(&state, &claims, evening).unwrap_err(),
            ApiError::AlreadyCheckedIn
        ));

        // Next WIB day
        let second = check_in_at(&state, &claims, wib_morning(11)).unwrap();
        assert_eq!(second.day.to_string(), "2026-01-11");

        assert_eq!(state.db.list_attendance(50).unwrap().len(), 2);
    }
}
