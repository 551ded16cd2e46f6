use crate::menu::TRANSITION_TIMEOUT;
use crate::menu::ring::{MenuItem, Ring, SharedRing};
use crate::menu::transition::TransitionDriver;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::timeout;

/// Externally visible submenu state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmenuSnapshot {
    pub open: bool,
    pub parent_index: Option<usize>,
    pub is_opening: bool,
    pub is_closing: bool,
}

#[derive(Default)]
struct CoordinatorInner {
    open: bool,
    parent_index: Option<usize>,
    active: Option<SharedRing>,
    is_opening: bool,
    is_closing: bool,
}

enum TransitionFlag {
    Opening,
    Closing,
}

/// Clears a transition flag when dropped, so the coordinator can never be
/// left stuck opening or closing, whatever happens to the animation await.
struct ClearFlag {
    inner: Arc<Mutex<CoordinatorInner>>,
    flag: TransitionFlag,
}

impl Drop for ClearFlag {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        match self.flag {
            TransitionFlag::Opening => inner.is_opening = false,
            TransitionFlag::Closing => inner.is_closing = false,
        }
    }
}

/// Enforces "at most one submenu, fully closed before the next opens".
///
/// Open and close are asynchronous but race-safe: requests arriving while
/// a transition is in flight are rejected outright, never queued, and the
/// flags that reject them clear through Drop guards even if a collaborator
/// fails mid-transition.
pub struct SubmenuCoordinator {
    inner: Arc<Mutex<CoordinatorInner>>,
    parent: SharedRing,
    driver: Arc<dyn TransitionDriver>,
    rotation_speed: f64,
}

impl SubmenuCoordinator {
    pub fn new(parent: SharedRing, driver: Arc<dyn TransitionDriver>, rotation_speed: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CoordinatorInner::default())),
            parent,
            driver,
            rotation_speed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    pub fn snapshot(&self) -> SubmenuSnapshot {
        let inner = self.inner.lock();
        SubmenuSnapshot {
            open: inner.open,
            parent_index: inner.parent_index,
            is_opening: inner.is_opening,
            is_closing: inner.is_closing,
        }
    }

    /// The ring input should route to, if any. Cleared at the start of the
    /// close sequence, before the exit animation, so a click can never reach
    /// a submenu that is visually present but logically closing.
    pub fn active_ring(&self) -> Option<SharedRing> {
        self.inner.lock().active.clone()
    }

    /// Opens a submenu for `parent_index`. Rejects while another transition
    /// is in flight or when `items` is empty; closes any submenu already
    /// open before the new one is built.
    pub async fn open(&self, parent_index: usize, items: Vec<MenuItem>) -> bool {
        if items.is_empty() {
            log::debug!("submenu open rejected: no items for index {}", parent_index);
            return false;
        }
        {
            let mut inner = self.inner.lock();
            if inner.is_opening || inner.is_closing {
                log::debug!("submenu open rejected: transition in flight");
                return false;
            }
            inner.is_opening = true;
        }
        let _opening = ClearFlag {
            inner: self.inner.clone(),
            flag: TransitionFlag::Opening,
        };

        // never run open and close concurrently
        if self.inner.lock().open {
            self.run_close().await;
        }

        let item_count = items.len();
        let ring = Arc::new(Mutex::new(Ring::new(items, None, self.rotation_speed)));
        {
            let mut inner = self.inner.lock();
            inner.active = Some(ring);
            inner.open = true;
            inner.parent_index = Some(parent_index);
        }
        {
            let mut parent = self.parent.lock();
            parent.snap_to_target();
            parent.guard_mut().lock_rotation();
        }

        let enter = self.driver.submenu_enter(parent_index, item_count);
        if timeout(TRANSITION_TIMEOUT, enter.wait()).await.is_err() {
            log::warn!("submenu entrance animation timed out; proceeding");
        }
        true
    }

    /// Closes the active submenu. Rejects when nothing is open or another
    /// transition is in flight.
    pub async fn close(&self) -> bool {
        {
            let mut inner = self.inner.lock();
            if !inner.open || inner.is_opening || inner.is_closing {
                log::debug!("submenu close rejected: nothing to close");
                return false;
            }
            inner.is_closing = true;
        }
        let _closing = ClearFlag {
            inner: self.inner.clone(),
            flag: TransitionFlag::Closing,
        };

        self.run_close().await;
        true
    }

    async fn run_close(&self) {
        let ring = {
            let mut inner = self.inner.lock();
            let Some(ring) = inner.active.take() else {
                return;
            };
            inner.open = false;
            inner.parent_index = None;
            ring
        };

        let item_count = ring.lock().len();
        let exit = self.driver.submenu_exit(item_count);
        if timeout(TRANSITION_TIMEOUT, exit.wait()).await.is_err() {
            log::warn!("submenu exit animation timed out; releasing anyway");
        }

        drop(ring);
        self.parent.lock().guard_mut().unlock_rotation();
    }
}
