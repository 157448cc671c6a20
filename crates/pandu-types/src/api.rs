use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Direction, Member, Report, Role};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and the auth handlers.
/// Canonical definition lives here in pandu-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub handle: String,
    pub display_name: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub handle: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub member_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub member_id: i64,
    pub display_name: String,
    pub role: Role,
    pub token: String,
}

// -- Ledger --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordEntryRequest {
    pub direction: Direction,
    pub amount: i64,
    pub memo: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub income: i64,
    pub expense: i64,
    pub balance: i64,
}

// -- Reports --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitReportRequest {
    pub message: String,
}

// -- Members / profile --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
}

/// Derived membership-card view (the original portal's KTA page).
#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipCard {
    pub member_no: String,
    pub handle: String,
    pub display_name: String,
    pub class: Option<String>,
    pub role: Role,
    pub member_since: NaiveDate,
}

/// Derived membership-certificate view (the original portal's charter page).
#[derive(Debug, Serialize, Deserialize)]
pub struct Certificate {
    pub certificate_no: String,
    pub display_name: String,
    pub role: Role,
    pub member_since: NaiveDate,
    pub issued_at: DateTime<Utc>,
}

// -- Directory / agenda --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddDirectoryEntryRequest {
    pub name: String,
    pub position: String,
    pub division: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddAgendaEntryRequest {
    pub title: String,
    pub location: String,
    pub scheduled_for: NaiveDate,
}

// -- Admin --

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminOverview {
    pub members: Vec<Member>,
    pub reports: Vec<Report>,
    pub ledger: BalanceResponse,
}
