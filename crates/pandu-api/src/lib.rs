pub mod app;
pub mod attendance;
pub mod auth;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod members;
pub mod middleware;
pub mod profile;
pub mod reports;
pub mod state;
