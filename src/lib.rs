//! Dormitory housing management service: role-scoped JSON APIs for students,
//! proctors, gate security, and maintenance staff, plus the QR scan
//! resolution pipeline used at the laundry pickup gate.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod scan;
