//! HTTP handlers for all web routes.

pub mod plot;
pub mod predict;
pub mod privacy;
