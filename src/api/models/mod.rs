//! Request and response bodies for the REST API.

pub mod auth;
pub mod dashboard;
pub mod users;
