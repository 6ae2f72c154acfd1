//! DigHyd Plot - chart requests against the hydrogen-storage materials dataset.
//!
//! 1. Bounded image store with high-watermark eviction
//! 2. Closed figure-type table and per-figure parameter validation
//! 3. Chart renderer contract (external plotting process)
//! 4. Dispatcher tying the three together per request

pub mod dispatch;
pub mod error;
pub mod figure;
pub mod renderer;
pub mod request;
pub mod store;

pub use dispatch::{PlotDispatcher, PlotOutcome};
pub use error::{PlotError, Result};
pub use figure::{FigureSpec, FigureType};
pub use renderer::{ChartRenderer, CommandRenderer, RenderJob, RenderRequest};
pub use request::PlotRequest;
pub use store::{CleanupReport, ImageSlot, ImageStore};
