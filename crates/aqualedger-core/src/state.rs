//! Aggregate sync state shown to the user.
//!
//! The state is always derived from the current record and queue counts; it
//! is never stored.

use serde::Serialize;

/// Number of catch records per sync status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub synced: usize,
    pub error: usize,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.synced + self.error
    }
}

/// Number of queued operations per queue status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    pub pending: usize,
    pub processing: usize,
    pub failed: usize,
}

impl QueueCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.processing + self.failed
    }
}

/// Worst-first aggregate sync state.
///
/// Variants are declared from most to least severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Error,
    Syncing,
    Pending,
    Synced,
    Offline,
}

impl SyncState {
    /// Derive the aggregate from counts and the loop's live flags.
    ///
    /// A failed queue entry counts as an error even when its record is gone
    /// (a failed delete). Fully synced is only claimed while online.
    #[must_use]
    pub const fn derive(
        records: &StatusCounts,
        queue: &QueueCounts,
        online: bool,
        syncing: bool,
    ) -> Self {
        if records.error > 0 || queue.failed > 0 {
            Self::Error
        } else if syncing && online {
            Self::Syncing
        } else if records.pending > 0 || queue.pending > 0 || queue.processing > 0 {
            Self::Pending
        } else if online {
            Self::Synced
        } else {
            Self::Offline
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Syncing => "syncing",
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Offline => "offline",
        }
    }

    /// Short human readable description
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Error => "Some catches failed to sync",
            Self::Syncing => "Syncing catches",
            Self::Pending => "Catches waiting to sync",
            Self::Synced => "All catches synced",
            Self::Offline => "Offline",
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn records(pending: usize, synced: usize, error: usize) -> StatusCounts {
        StatusCounts {
            pending,
            synced,
            error,
        }
    }

    #[test]
    fn error_outranks_everything() {
        let state = SyncState::derive(&records(3, 4, 1), &QueueCounts::default(), true, true);
        assert_eq!(state, SyncState::Error);
    }

    #[test]
    fn failed_delete_is_an_error_without_a_record() {
        let queue = QueueCounts {
            failed: 1,
            ..QueueCounts::default()
        };
        assert_eq!(
            SyncState::derive(&records(0, 2, 0), &queue, true, false),
            SyncState::Error
        );
    }

    #[test]
    fn syncing_outranks_pending() {
        assert_eq!(
            SyncState::derive(&records(2, 0, 0), &QueueCounts::default(), true, true),
            SyncState::Syncing
        );
        assert_eq!(
            SyncState::derive(&records(2, 0, 0), &QueueCounts::default(), true, false),
            SyncState::Pending
        );
    }

    #[test]
    fn pending_is_reported_while_offline() {
        assert_eq!(
            SyncState::derive(&records(1, 5, 0), &QueueCounts::default(), false, false),
            SyncState::Pending
        );
    }

    #[test]
    fn synced_only_while_online() {
        assert_eq!(
            SyncState::derive(&records(0, 5, 0), &QueueCounts::default(), true, false),
            SyncState::Synced
        );
        assert_eq!(
            SyncState::derive(&records(0, 5, 0), &QueueCounts::default(), false, false),
            SyncState::Offline
        );
    }

    #[test]
    fn severity_order_matches_declaration() {
        assert!(SyncState::Error < SyncState::Syncing);
        assert!(SyncState::Pending < SyncState::Synced);
        assert!(SyncState::Synced < SyncState::Offline);
    }
}
