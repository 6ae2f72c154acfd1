//! dighyd-web: HTTP surface for the DigHyd services.
//! Two independent routers:
//!   - Plot service: chart rendering, image hosting, privacy policy
//!   - Predict service: property prediction from a chemical formula

pub mod handlers;
pub mod router;
pub mod state;
