//! Eventual sync of queued catch mutations to the remote ledger.
//!
//! [`SyncLoop`] drains the durable queue kept by [`crate::services::CatchStore`]
//! through a [`RemoteLedger`] whenever [`Connectivity`] reports the device
//! online. Failed operations stay queued and are retried with
//! [`BackoffPolicy`].

mod backoff;
mod connectivity;
mod engine;
mod remote;

pub use backoff::BackoffPolicy;
pub use connectivity::Connectivity;
pub use engine::{DrainReport, SyncLoop};
pub use remote::{HttpRemoteLedger, RemoteLedger, SyncError, SyncResult};
