//! Per-locale state: load progress, cached table and consumer count.

use std::sync::Arc;
use std::time::{
    Duration,
    Instant,
};

use futures::future::{
    BoxFuture,
    Shared,
};

use crate::error::LoadError;
use crate::table::TranslationTable;

/// Outcome of one load, shared by everyone waiting on it.
pub(super) type LoadResult = Result<Arc<TranslationTable>, LoadError>;

/// Handle to an in-flight load that any number of callers can await.
pub(super) type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Where a locale's table is in its lifecycle.
#[derive(Default)]
pub(super) enum LoadState {
    /// Nothing cached and no load running.
    #[default]
    Absent,
    /// A load is running. `generation` identifies it so a load that was
    /// invalidated while running does not store its result.
    Loading { generation: u64, load: SharedLoad },
    /// A load is still running but its slot was evicted; its result will be
    /// dropped. The next load of the locale starts only after it finishes.
    Detached { generation: u64, load: SharedLoad },
    /// The table is cached.
    Ready { table: Arc<TranslationTable>, last_access: Instant },
}

/// Everything the cache knows about one locale.
///
/// Consumers and the cached table live in the same slot so both eviction rules
/// are decided under the same shard lock.
#[derive(Default)]
pub(super) struct Slot {
    /// Cached table or load progress.
    pub(super) state: LoadState,
    /// Registered consumers. Zero means the locale is not tracked.
    pub(super) consumers: u32,
    /// Sequence number of the registration that took `consumers` off zero.
    pub(super) registered_at: u64,
}

impl Slot {
    /// Nothing cached, loading or counted: the slot can be dropped from the map.
    pub(super) const fn is_vacant(&self) -> bool {
        self.consumers == 0 && matches!(self.state, LoadState::Absent)
    }

    /// Drops a ready table whose last access is more than `idle` ago.
    pub(super) fn expire_if_idle(&mut self, now: Instant, idle: Duration) -> bool {
        let expired = matches!(
            &self.state,
            LoadState::Ready { last_access, .. } if now.saturating_duration_since(*last_access) > idle
        );
        if expired {
            self.state = LoadState::Absent;
        }
        expired
    }

    /// Forgets the table or detaches the in-flight load.
    ///
    /// Returns `true` if a ready table was dropped.
    pub(super) fn evict(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            LoadState::Ready { .. } => true,
            LoadState::Loading { generation, load } => {
                self.state = LoadState::Detached { generation, load };
                false
            }
            detached @ LoadState::Detached { .. } => {
                self.state = detached;
                false
            }
            LoadState::Absent => false,
        }
    }

    /// Marks detached load `generation` as finished.
    pub(super) fn finish_detached(&mut self, generation: u64) {
        if matches!(self.state, LoadState::Detached { generation: current, .. } if current == generation)
        {
            self.state = LoadState::Absent;
        }
    }

    /// The ready table, unless it is past its idle deadline.
    pub(super) fn fresh_table(&self, now: Instant, idle: Duration) -> Option<&Arc<TranslationTable>> {
        match &self.state {
            LoadState::Ready { table, last_access }
                if now.saturating_duration_since(*last_access) <= idle =>
            {
                Some(table)
            }
            _ => None,
        }
    }

    /// Whether `generation` is the load currently in flight.
    pub(super) const fn is_loading(&self, generation: u64) -> bool {
        matches!(self.state, LoadState::Loading { generation: current, .. } if current == generation)
    }
}
