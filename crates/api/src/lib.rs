#![recursion_limit = "256"]

pub mod app;
pub mod auth;
pub mod error;
pub mod gql;
pub mod middleware;
pub mod state;
