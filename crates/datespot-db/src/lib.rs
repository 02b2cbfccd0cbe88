//! Datespot DB - PostgreSQL persistence for place records
//!
//! This crate implements the place store used by the load stage: one
//! exclusively owned connection, one transaction per batch, conflict
//! resolution on `kakao_id`.
//!
//! # Overview
//!
//! The main components are:
//! - [`PgPlaceConnector`] - Opens connections from a `StoreConfig`
//! - [`PgPlaceStore`] - Atomic batch upsert into the `places` table

mod repository;

pub use repository::{PgPlaceConnector, PgPlaceStore, UPSERT_SQL};
