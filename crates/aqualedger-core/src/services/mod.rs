//! Shared services used by every client.

mod capture;
mod store;

pub use capture::{CatchCapture, Captured};
pub use store::CatchStore;
