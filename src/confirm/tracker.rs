//! Confirmation tracking for broadcast transactions.
//!
//! # Responsibilities
//! - Poll receipts for watched transaction hashes
//! - Count confirmation depth against the latest block
//! - Deliver exactly one terminal outcome per watch
//! - Bound each watch by a configurable total wait
//!
//! # Data Flow
//! 1. `watch` registers the hash and spawns a poll task
//! 2. Each tick fetches the receipt and the current block number
//! 3. Progress is reported through the callback; the first terminal event
//!    wins, whether from the poller, the timeout, or a cancel

use alloy::primitives::B256;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::config::ConfirmationConfig;
use crate::error::{WalletError, WalletResult};

/// Event stream delivered to a watch callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationEvent {
    /// Confirmation depth changed; more ticks follow.
    Progress { observed: u64 },
    /// Final state; no further events for this hash.
    Terminal(ConfirmationOutcome),
}

/// Final state of a watched transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Mined successfully with the required depth.
    Confirmed {
        block_number: u64,
        confirmations: u64,
    },
    /// Mined but reverted.
    Failed { block_number: u64 },
    /// Not confirmed within the wait bound. The transaction may still land.
    TimedOut,
    /// Watch cancelled by the caller.
    Cancelled,
}

/// Callback invoked with progress and terminal events for one watch.
pub type EventCallback = Box<dyn Fn(ConfirmationEvent) + Send + Sync>;

struct Watch {
    callback: EventCallback,
    /// Confirmation depth this watch waits for.
    required: u64,
    observed: AtomicU64,
    /// First-wins gate: whoever flips this delivers the terminal event.
    done: AtomicBool,
    handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Watch {
    /// Deliver `outcome` if no terminal event has fired yet. Returns whether
    /// this call won the gate.
    fn finish(&self, outcome: ConfirmationOutcome) -> bool {
        if self.done.swap(true, Ordering::SeqCst) {
            return false;
        }
        (self.callback)(ConfirmationEvent::Terminal(outcome));
        true
    }

    fn progress(&self, observed: u64) {
        if self.done.load(Ordering::SeqCst) {
            return;
        }
        let previous = self.observed.swap(observed, Ordering::SeqCst);
        if observed != previous {
            (self.callback)(ConfirmationEvent::Progress { observed });
        }
    }
}

/// Tracks broadcast transactions until they reach a terminal state.
pub struct ConfirmationTracker {
    client: Arc<dyn ChainClient>,
    config: ConfirmationConfig,
    watches: Arc<DashMap<B256, Arc<Watch>>>,
}

impl ConfirmationTracker {
    pub fn new(client: Arc<dyn ChainClient>, config: ConfirmationConfig) -> Self {
        Self {
            client,
            config,
            watches: Arc::new(DashMap::new()),
        }
    }

    /// Watch `hash` until it reaches `required` confirmations (or another
    /// terminal state) and await the outcome.
    pub async fn watch(&self, hash: B256, required: u64) -> WalletResult<ConfirmationOutcome> {
        let (tx, rx) = oneshot::channel();
        let tx = std::sync::Mutex::new(Some(tx));

        self.watch_with_callback(
            hash,
            required,
            Box::new(move |event| {
                if let ConfirmationEvent::Terminal(outcome) = event {
                    if let Ok(mut slot) = tx.lock() {
                        if let Some(sender) = slot.take() {
                            let _ = sender.send(outcome);
                        }
                    }
                }
            }),
        )?;

        rx.await.map_err(|_| {
            WalletError::Network("confirmation watch ended without a terminal event".into())
        })
    }

    /// Watch `hash` at a per-transaction confirmation depth, delivering
    /// progress and the single terminal event to `callback`. Returns
    /// immediately; polling runs in a background task.
    pub fn watch_with_callback(
        &self,
        hash: B256,
        required: u64,
        callback: EventCallback,
    ) -> WalletResult<()> {
        use dashmap::mapref::entry::Entry;

        let watch = Arc::new(Watch {
            callback,
            required,
            observed: AtomicU64::new(0),
            done: AtomicBool::new(false),
            handle: std::sync::Mutex::new(None),
        });

        match self.watches.entry(hash) {
            Entry::Occupied(_) => {
                return Err(WalletError::Validation(format!(
                    "transaction {} is already being watched",
                    hash
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(watch.clone());
            }
        }

        let client = self.client.clone();
        let config = self.config.clone();
        let watches = self.watches.clone();
        let task_watch = watch.clone();
        let handle = tokio::spawn(async move {
            let poll = poll_until_terminal(client, &config, hash, &task_watch);
            let outcome =
                match tokio::time::timeout(Duration::from_millis(config.max_wait_ms), poll).await {
                    Ok(outcome) => outcome,
                    Err(_) => ConfirmationOutcome::TimedOut,
                };

            if task_watch.finish(outcome) {
                info!(%hash, ?outcome, "Transaction reached terminal state");
            }
            watches.remove(&hash);
        });

        // Stored on the shared watch, not via a registry re-lookup, so a
        // cancel racing this registration still finds the handle.
        if let Ok(mut slot) = watch.handle.lock() {
            *slot = Some(handle);
        }

        debug!(%hash, required, "Confirmation watch started");
        Ok(())
    }

    /// Cancel a watch. Fires `Cancelled` unless the watch already reached a
    /// terminal state; cancelling an unknown hash is a no-op.
    pub fn cancel(&self, hash: B256) {
        if let Some((_, watch)) = self.watches.remove(&hash) {
            watch.finish(ConfirmationOutcome::Cancelled);
            if let Ok(mut slot) = watch.handle.lock() {
                if let Some(handle) = slot.take() {
                    handle.abort();
                }
            }
            info!(%hash, "Confirmation watch cancelled");
        }
    }

    /// Cancel every active watch.
    pub fn stop_all(&self) {
        let hashes: Vec<B256> = self.watches.iter().map(|entry| *entry.key()).collect();
        for hash in hashes {
            self.cancel(hash);
        }
    }

    /// Whether `hash` has an active watch.
    pub fn is_watching(&self, hash: B256) -> bool {
        self.watches.contains_key(&hash)
    }

    /// Number of active watches.
    pub fn active_count(&self) -> usize {
        self.watches.len()
    }

    /// Confirmation depth last observed for `hash`, if watched.
    pub fn observed_confirmations(&self, hash: B256) -> Option<u64> {
        self.watches
            .get(&hash)
            .map(|watch| watch.observed.load(Ordering::SeqCst))
    }

    /// Point-in-time view of an active watch.
    pub fn snapshot(&self, hash: B256) -> Option<WatchSnapshot> {
        self.watches.get(&hash).map(|watch| WatchSnapshot {
            hash,
            required_confirmations: watch.required,
            observed_confirmations: watch.observed.load(Ordering::SeqCst),
        })
    }
}

/// Point-in-time view of a watch, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSnapshot {
    pub hash: B256,
    pub required_confirmations: u64,
    pub observed_confirmations: u64,
}

impl std::fmt::Debug for ConfirmationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationTracker")
            .field("config", &self.config)
            .field("active", &self.watches.len())
            .finish()
    }
}

/// Poll the receipt until the transaction confirms or fails.
async fn poll_until_terminal(
    client: Arc<dyn ChainClient>,
    config: &ConfirmationConfig,
    hash: B256,
    watch: &Watch,
) -> ConfirmationOutcome {
    let interval = Duration::from_millis(config.poll_interval_ms);

    loop {
        // A cancel may land before this task's abort handle is registered;
        // the gate tells us the watch is already settled.
        if watch.done.load(Ordering::SeqCst) {
            return ConfirmationOutcome::Cancelled;
        }
        match check_once(&client, watch.required, hash).await {
            Ok(Tick::Terminal(outcome)) => return outcome,
            Ok(Tick::Confirming(observed)) => watch.progress(observed),
            Ok(Tick::NotMined) => {}
            Err(e) => {
                // Transient node trouble; keep polling inside the wait bound.
                warn!(%hash, error = %e, "Receipt poll failed, retrying");
            }
        }
        tokio::time::sleep(interval).await;
    }
}

enum Tick {
    NotMined,
    Confirming(u64),
    Terminal(ConfirmationOutcome),
}

/// One poll tick: fetch the receipt and measure confirmation depth.
async fn check_once(
    client: &Arc<dyn ChainClient>,
    required: u64,
    hash: B256,
) -> WalletResult<Tick> {
    let Some(receipt) = client.transaction_receipt(hash).await? else {
        return Ok(Tick::NotMined);
    };
    let Some(mined_in) = receipt.block_number else {
        return Ok(Tick::NotMined);
    };

    if !receipt.succeeded {
        return Ok(Tick::Terminal(ConfirmationOutcome::Failed {
            block_number: mined_in,
        }));
    }

    let current = client.block_number().await?;
    // The mined block itself counts as the first confirmation.
    let confirmations = current.saturating_sub(mined_in) + 1;

    if confirmations >= required {
        Ok(Tick::Terminal(ConfirmationOutcome::Confirmed {
            block_number: mined_in,
            confirmations,
        }))
    } else {
        Ok(Tick::Confirming(confirmations))
    }
}
