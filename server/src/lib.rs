//! Medilink telehealth coordination server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod chat;
pub mod config;
pub mod doctors;
pub mod error;
pub mod profile;
pub mod routes;
pub mod state;
pub mod store;
pub mod ws;
