//! HTTP surface: account endpoints, broker proxy callbacks and wiring.

pub mod accounts;
pub mod app;
pub mod gateway;
pub mod middleware;
