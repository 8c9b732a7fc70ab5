//! Relational store for member accounts and their provider connections.
//!
//! SQLite via sqlx; an in-memory database doubles as the test fixture.

pub mod connections;
pub mod db;

pub use connections::{AccountConnections, ConnectionInfo, ConnectionStore, NewConnection};
pub use db::Database;
