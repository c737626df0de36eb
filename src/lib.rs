//! cursor-gateway-service: a generateContent-style HTTP facade over the
//! Cursor agent CLI. One route, one subprocess per request.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod services;
pub mod startup;
