//! Dirty-bit tracking and the background listener that drives resyncs.
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{CommunityEventHandler, CommunitySocket, SocketServices};
use crate::ds::{QueryTransport, StanzaFilter};

/// Route of the server push announcing stale cached state.
pub const DIRTY_ROUTE: &str = "ib,,dirty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyState {
    /// Local state is in sync (or no push has been seen yet).
    Clean,
    /// A dirty push arrived and the resync has not been acknowledged.
    DirtyPending,
}

impl Display for DirtyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            DirtyState::Clean => "Clean",
            DirtyState::DirtyPending => "DirtyPending",
        };
        write!(f, "{state}")
    }
}

/// What a dirty push led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyOutcome {
    /// The push named another category.
    Ignored,
    /// Communities were refetched (count given) and the bit acknowledged.
    Resynced(usize),
}

/// Two-state cell for the communities dirty bit.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty: AtomicBool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DirtyState {
        if self.dirty.load(Ordering::SeqCst) {
            DirtyState::DirtyPending
        } else {
            DirtyState::Clean
        }
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn mark_clean(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

/// Spawn a task that feeds dirty pushes from the transport into
/// [`CommunitySocket::handle_dirty_push`] until `cancel` fires or the
/// transport closes its channel.
///
/// Handler failures are logged and do not stop the listener.
pub fn spawn_dirty_listener<T, S, H>(
    socket: Arc<CommunitySocket<T, S, H>>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    T: QueryTransport,
    S: SocketServices,
    H: CommunityEventHandler + 'static,
{
    let mut inbound = socket.transport().subscribe();
    let filter = StanzaFilter::with_route(DIRTY_ROUTE);

    tokio::spawn(async move {
        info!("[dirty_listener]: Started");
        loop {
            let node = tokio::select! {
                _ = cancel.cancelled() => break,
                received = inbound.recv() => match received {
                    Ok(node) => node,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("[dirty_listener]: Skipped {skipped} inbound stanzas");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
            };
            if !filter.accepts(&node).await {
                continue;
            }
            match socket.handle_dirty_push(&node).await {
                Ok(outcome) => info!("[dirty_listener]: {outcome:?}"),
                Err(e) => error!(
                    "[dirty_listener]: Resync failed, dirty bit left {}: {e}",
                    socket.dirty_state()
                ),
            }
        }
        info!("[dirty_listener]: Stopped");
    })
}
