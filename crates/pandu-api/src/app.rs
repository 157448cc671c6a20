use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{attendance, auth, directory, ledger, members, profile, reports};

/// The full route table. CORS and request tracing are layered on by the
/// binary; tests drive this router directly.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/attendance", get(attendance::list))
        .route("/attendance/check-in", post(attendance::check_in))
        .route("/ledger", get(ledger::list))
        .route("/ledger/balance", get(ledger::balance))
        .route("/ledger/entries", post(ledger::record))
        .route("/reports", get(reports::list).post(reports::submit))
        .route("/reports/{id}", delete(reports::resolve))
        .route("/members", get(members::list))
        .route("/members/{id}", delete(members::remove))
        .route("/members/{id}/role", put(members::set_role))
        .route("/profile", get(profile::show).put(profile::update))
        .route("/profile/card", get(profile::card))
        .route("/profile/certificate", get(profile::certificate))
        .route("/directory", get(directory::list).post(directory::add))
        .route("/directory/{id}", delete(directory::remove))
        .route("/agenda", get(directory::list_agenda).post(directory::add_agenda))
        .route("/agenda/{id}", delete(directory::remove_agenda))
        .route("/admin/overview", get(members::overview))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}
