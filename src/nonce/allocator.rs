//! Per-address nonce allocation.
//!
//! # Responsibilities
//! - Hand out strictly increasing, gap-free nonces per sender
//! - Reclaim released nonces before advancing past them
//! - Resynchronize with the network's pending count when it moves ahead
//! - Compact confirmed entries so tracked state stays bounded
//!
//! # Data Flow
//! 1. `next_nonce` queries the pending count under the address lock
//! 2. The allocator reconciles its cursor with the network value
//! 3. The lowest reusable nonce (released or fresh) is marked pending
//!
//! Each address has its own async mutex; allocations for different senders
//! never contend. The lock is held across the network query so concurrent
//! callers for one sender serialize, but it is never held across a broadcast.

use alloy::primitives::Address;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::chain::ChainClient;
use crate::error::WalletResult;

/// Lifecycle of a tracked nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceStatus {
    /// Allocated, presumed in flight.
    Pending,
    /// Mined with the required confirmation depth.
    Confirmed,
    /// Allocated but never broadcast; eligible for reuse.
    Released,
}

#[derive(Debug, Default)]
struct NonceState {
    /// Next fresh nonce to hand out. `None` until the first network sync.
    cursor: Option<u64>,
    /// Tracked nonces below or at the cursor.
    entries: BTreeMap<u64, NonceStatus>,
}

/// Allocates transaction nonces per sender address.
pub struct NonceAllocator {
    client: Arc<dyn ChainClient>,
    states: DashMap<Address, Arc<Mutex<NonceState>>>,
}

impl NonceAllocator {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self {
            client,
            states: DashMap::new(),
        }
    }

    /// Allocate the next nonce for `address`, marking it pending.
    ///
    /// Queries the network's pending transaction count and resets local state
    /// when the network has moved ahead (transactions sent outside this
    /// allocator). Released nonces below the cursor are reused lowest-first
    /// before any fresh value.
    pub async fn next_nonce(&self, address: Address) -> WalletResult<u64> {
        let state = self.state_for(address);
        let mut state = state.lock().await;

        let network = self.client.pending_transaction_count(address).await?;

        match state.cursor {
            Some(cursor) if network > cursor => {
                // Another sender path consumed nonces; local bookkeeping for
                // anything below the network count is stale.
                info!(
                    %address,
                    local = cursor,
                    network,
                    "Network nonce ahead of local cursor, resetting"
                );
                state.entries.clear();
                state.cursor = Some(network);
            }
            None => {
                state.cursor = Some(network);
            }
            Some(_) => {}
        }

        // Scan from the network floor: reuse the lowest released value,
        // otherwise take the first untracked one.
        let mut candidate = network;
        loop {
            match state.entries.get(&candidate) {
                Some(NonceStatus::Pending) | Some(NonceStatus::Confirmed) => {
                    candidate += 1;
                }
                Some(NonceStatus::Released) | None => break,
            }
        }

        state.entries.insert(candidate, NonceStatus::Pending);
        if state.cursor.is_some_and(|cursor| candidate >= cursor) {
            state.cursor = Some(candidate + 1);
        }

        debug!(%address, nonce = candidate, "Nonce allocated");
        Ok(candidate)
    }

    /// Return an allocated nonce that was never broadcast.
    ///
    /// The value becomes the next one handed out for this address, ahead of
    /// any fresh nonce.
    pub async fn release_nonce(&self, address: Address, nonce: u64) {
        let state = self.state_for(address);
        let mut state = state.lock().await;

        state.entries.insert(nonce, NonceStatus::Released);
        // Pull the cursor back so the scan revisits the released value.
        if state.cursor.is_some_and(|cursor| nonce < cursor) {
            state.cursor = Some(nonce);
        }

        debug!(%address, nonce, "Nonce released for reuse");
    }

    /// Record that a nonce's transaction reached the required confirmation
    /// depth, then drop the confirmed prefix.
    pub async fn confirm_nonce(&self, address: Address, nonce: u64) {
        let state = self.state_for(address);
        let mut state = state.lock().await;

        state.entries.insert(nonce, NonceStatus::Confirmed);
        compact(&mut state.entries);

        debug!(%address, nonce, "Nonce confirmed");
    }

    /// Discard local state for `address`; the next allocation starts from the
    /// network count.
    pub async fn resync(&self, address: Address) {
        if let Some(state) = self.states.get(&address).map(|s| s.value().clone()) {
            let mut state = state.lock().await;
            state.cursor = None;
            state.entries.clear();
            info!(%address, "Nonce state resynchronized");
        }
    }

    /// Drop tracked state for one address.
    pub fn forget(&self, address: Address) {
        self.states.remove(&address);
    }

    /// Drop all tracked addresses.
    pub fn clear(&self) {
        self.states.clear();
    }

    /// Number of nonces currently tracked for `address`.
    pub async fn tracked_count(&self, address: Address) -> usize {
        match self.states.get(&address).map(|s| s.value().clone()) {
            Some(state) => state.lock().await.entries.len(),
            None => 0,
        }
    }

    fn state_for(&self, address: Address) -> Arc<Mutex<NonceState>> {
        self.states.entry(address).or_default().clone()
    }
}

impl std::fmt::Debug for NonceAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceAllocator")
            .field("addresses", &self.states.len())
            .finish()
    }
}

/// Remove the confirmed run at the bottom of the map. Entries above the
/// lowest non-confirmed nonce stay tracked.
fn compact(entries: &mut BTreeMap<u64, NonceStatus>) {
    let confirmed_prefix: Vec<u64> = entries
        .iter()
        .take_while(|(_, status)| **status == NonceStatus::Confirmed)
        .map(|(nonce, _)| *nonce)
        .collect();
    for nonce in confirmed_prefix {
        entries.remove(&nonce);
    }
}
