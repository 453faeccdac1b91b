//! Postgres storage collaborator for persisted activities.

mod activity_repository;
mod client;

pub use activity_repository::{ActivityRow, PostgresActivityRepository};
pub use client::{PostgresClient, PostgresConfig};
