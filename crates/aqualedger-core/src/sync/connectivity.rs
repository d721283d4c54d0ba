//! Process-wide network reachability signal

use std::sync::Arc;

use tokio::sync::watch;

/// Shared `online` flag observed by the sync loop.
///
/// Clones share the same flag. Whatever detects reachability (an OS hook, a
/// probe, a CLI flag) calls [`Connectivity::set_online`].
#[derive(Debug, Clone)]
pub struct Connectivity {
    sender: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            sender: Arc::new(sender),
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Update the flag; returns whether it changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!("Connectivity changed: {}", if online { "online" } else { "offline" });
        }
        changed
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Resolve once `receiver` reports offline; never resolves if the flag is gone.
pub(crate) async fn wait_until_offline(receiver: &mut watch::Receiver<bool>) {
    if receiver.wait_for(|online| !*online).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn set_online_reports_changes_only() {
        let connectivity = Connectivity::new(false);
        assert!(!connectivity.is_online());
        assert!(connectivity.set_online(true));
        assert!(!connectivity.set_online(true));
        assert!(connectivity.is_online());
    }

    #[test]
    fn clones_share_the_flag() {
        let connectivity = Connectivity::default();
        let clone = connectivity.clone();
        clone.set_online(true);
        assert!(connectivity.is_online());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wait_until_offline_resolves_when_going_offline() {
        let connectivity = Connectivity::new(true);
        let mut receiver = connectivity.subscribe();

        let waiter = tokio::spawn(async move {
            wait_until_offline(&mut receiver).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        connectivity.set_online(false);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
