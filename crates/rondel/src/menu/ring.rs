use crate::menu::guard::SelectionGuard;
use crate::menu::transition::{Transition, TransitionGate};
use crate::menu::{MIN_ROTATION_SPEED, REFERENCE_FRAME_RATE, SNAP_THRESHOLD};
use crate::persist::SelectionStore;
use parking_lot::Mutex;
use std::f64::consts::{PI, TAU};
use std::sync::Arc;
use vitrine::catalog::{CatalogEntry, ItemLabel};

pub type SharedRing = Arc<Mutex<Ring>>;

/// Signed shortest rotation from `from` to `to`, normalized into (-PI, PI].
pub fn shortest_arc(from: f64, to: f64) -> f64 {
    let delta = (to - from).rem_euclid(TAU);
    if delta > PI { delta - TAU } else { delta }
}

/// The index whose natural angle (`index * 2PI/len`) is angularly nearest
/// to the front implied by `rotation`. Ties go to the lowest index.
pub fn index_from_rotation(rotation: f64, len: usize) -> usize {
    let front = (-rotation).rem_euclid(TAU);
    let step = TAU / len as f64;

    (0..len)
        .min_by(|&a, &b| {
            shortest_arc(a as f64 * step, front)
                .abs()
                .total_cmp(&shortest_arc(b as f64 * step, front).abs())
        })
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: ItemLabel,
    /// Opaque catalog payload; the ring never looks inside.
    pub entry: Option<CatalogEntry>,
    pub children: Vec<MenuItem>,
    pub selected: bool,
}

impl MenuItem {
    pub fn new(label: ItemLabel) -> Self {
        Self {
            label,
            entry: None,
            children: Vec::new(),
            selected: false,
        }
    }

    pub fn with_children(label: ItemLabel, children: Vec<MenuItem>) -> Self {
        Self {
            label,
            entry: None,
            children,
            selected: false,
        }
    }

    pub fn from_entry(entry: CatalogEntry) -> Self {
        let children = entry.children.iter().cloned().map(Self::from_entry).collect();
        Self {
            label: entry.label.clone(),
            entry: Some(entry),
            children,
            selected: false,
        }
    }

    pub fn has_submenu(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn submenu_items(&self) -> Vec<MenuItem> {
        self.children.clone()
    }
}

/// What one frame tick changed, for the renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickReport {
    pub redraw: bool,
    pub settled: bool,
    pub highlight: Option<usize>,
}

/// One rotating collection of selectable items.
///
/// The logical selection (`current_index`) commits synchronously in
/// [`Ring::select_item`]; only the visual rotation settles over frames.
/// `target_rotation` is unbounded and accumulates so deltas always take
/// the short way around.
pub struct Ring {
    items: Vec<MenuItem>,
    current_index: usize,
    rotation: f64,
    target_rotation: f64,
    rotation_speed: f64,
    settling: bool,
    guard: SelectionGuard,
    highlight_index: usize,
    release_on_settle: bool,
    settle_waiters: Vec<TransitionGate>,
    store: Option<Arc<dyn SelectionStore>>,
}

impl Ring {
    pub fn new(
        items: Vec<MenuItem>,
        store: Option<Arc<dyn SelectionStore>>,
        rotation_speed: f64,
    ) -> Self {
        assert!(!items.is_empty(), "a ring needs at least one item");

        let len = items.len();
        let index = store
            .as_ref()
            .and_then(|s| s.read())
            .map(|i| i.min(len - 1))
            .unwrap_or(0);
        let rotation = -(index as f64) * (TAU / len as f64);

        let mut ring = Self {
            items,
            current_index: index,
            rotation,
            target_rotation: rotation,
            rotation_speed: rotation_speed.clamp(MIN_ROTATION_SPEED, 1.0),
            settling: false,
            guard: SelectionGuard::default(),
            highlight_index: index,
            release_on_settle: false,
            settle_waiters: Vec::new(),
            store,
        };
        ring.apply_highlight(index);
        ring
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn highlight_index(&self) -> usize {
        self.highlight_index
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn target_rotation(&self) -> f64 {
        self.target_rotation
    }

    pub fn is_settling(&self) -> bool {
        self.settling
    }

    pub fn guard(&self) -> &SelectionGuard {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut SelectionGuard {
        &mut self.guard
    }

    pub fn angle_step(&self) -> f64 {
        TAU / self.items.len() as f64
    }

    /// Runs `op` under the selection lock: a silent no-op while the guard
    /// disallows commits, otherwise `is_animating` is held until the visual
    /// settle the operation started has completed.
    fn with_selection_lock(&mut self, op: impl FnOnce(&mut Self)) -> bool {
        if !self.guard.can_select() {
            log::debug!("selection rejected: guard busy");
            return false;
        }
        self.guard.begin_transition();
        self.release_on_settle = true;

        op(self);

        // op snapped instead of animating
        if !self.settling {
            self.finish_settle();
        }
        true
    }

    /// Commits `index` as the selection. The commit is synchronous; with
    /// `animate` the rotation settles toward the target over frames, the
    /// short way around, even when invoked mid-animation.
    pub fn select_item(&mut self, index: usize, animate: bool) -> bool {
        if index >= self.items.len() {
            log::debug!("select rejected: index {} out of range", index);
            return false;
        }

        self.with_selection_lock(|ring| {
            let target_angle = -(index as f64) * ring.angle_step();
            let delta = shortest_arc(ring.rotation, target_angle);
            ring.target_rotation = ring.rotation + delta;

            ring.current_index = index;
            ring.persist();
            ring.apply_highlight(index);

            if animate && delta.abs() > SNAP_THRESHOLD {
                ring.settling = true;
            } else {
                ring.rotation = ring.target_rotation;
            }
        })
    }

    pub fn next(&mut self) -> bool {
        if !self.guard.can_select() {
            log::debug!("next rejected: guard busy");
            return false;
        }
        let index = (self.current_index + 1) % self.items.len();
        self.select_item(index, true)
    }

    pub fn prev(&mut self) -> bool {
        if !self.guard.can_select() {
            log::debug!("prev rejected: guard busy");
            return false;
        }
        let len = self.items.len();
        let index = (self.current_index + len - 1) % len;
        self.select_item(index, true)
    }

    /// Continuous-input entry point (drag/swipe tracking). Deliberately
    /// exempt from the selection lock: the target just accumulates and
    /// [`Ring::tick`] converges on whatever it is last. Inert while the
    /// rotation is externally locked.
    pub fn spin(&mut self, delta: f64) {
        if self.guard.rotation_locked() {
            log::debug!("spin rejected: rotation locked");
            return;
        }
        self.target_rotation += delta;
        if (self.target_rotation - self.rotation).abs() > SNAP_THRESHOLD {
            self.settling = true;
        }
    }

    /// Advances the visual rotation one frame toward the target.
    ///
    /// While converging, only the highlight follows the visually nearest
    /// item; `current_index` recommits on settle, so a continuous scroll
    /// never half-selects an item it merely passed.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let mut report = TickReport::default();
        if !self.guard.can_animate() {
            return report;
        }

        let delta = self.target_rotation - self.rotation;
        if delta.abs() > SNAP_THRESHOLD {
            let gain = 1.0 - (1.0 - self.rotation_speed).powf(dt * REFERENCE_FRAME_RATE);
            self.rotation += delta * gain;
            self.settling = true;
            report.redraw = true;

            if self.guard.can_update_highlight() {
                let nearest = index_from_rotation(self.rotation, self.items.len());
                if nearest != self.highlight_index {
                    // highlight-only: the glow follows, the commit waits
                    self.highlight_index = nearest;
                    report.highlight = Some(nearest);
                }
            }
        } else if self.settling {
            self.rotation = self.target_rotation;

            let landed = index_from_rotation(self.rotation, self.items.len());
            if landed != self.current_index {
                self.current_index = landed;
                self.persist();
            }
            if self.apply_highlight(landed) {
                report.highlight = Some(landed);
            }

            self.finish_settle();
            report.redraw = true;
            report.settled = true;
        }
        report
    }

    /// Forces any in-flight settle to complete this instant, releasing the
    /// selection lock and firing settle waiters. No-op when already settled.
    pub fn snap_to_target(&mut self) {
        if !self.settling && !self.guard.is_animating() {
            return;
        }
        self.rotation = self.target_rotation;

        let landed = index_from_rotation(self.rotation, self.items.len());
        if landed != self.current_index {
            self.current_index = landed;
            self.persist();
        }
        self.apply_highlight(landed);
        self.finish_settle();
    }

    /// Completes when the ring next reaches settled state; already-settled
    /// rings complete immediately.
    pub fn settled_signal(&mut self) -> Transition {
        if !self.settling {
            return Transition::ready();
        }
        let (gate, transition) = Transition::gated();
        self.settle_waiters.push(gate);
        transition
    }

    fn finish_settle(&mut self) {
        self.settling = false;
        if self.release_on_settle {
            self.guard.end_transition();
            self.release_on_settle = false;
        }
        for gate in self.settle_waiters.drain(..) {
            gate.complete();
        }
    }

    /// Marks exactly one item selected. Returns whether anything changed.
    fn apply_highlight(&mut self, index: usize) -> bool {
        let mut changed = self.highlight_index != index;
        for (i, item) in self.items.iter_mut().enumerate() {
            let selected = i == index;
            if item.selected != selected {
                item.selected = selected;
                changed = true;
            }
        }
        self.highlight_index = index;
        changed
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            store.write(self.current_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemorySelectionStore;

    const DT: f64 = 1.0 / 60.0;

    fn ring_of(n: usize) -> Ring {
        let items = (0..n)
            .map(|i| MenuItem::new(ItemLabel::new(format!("item-{i}"))))
            .collect();
        Ring::new(items, None, 0.3)
    }

    fn settle(ring: &mut Ring) {
        for _ in 0..600 {
            let report = ring.tick(DT);
            if report.settled || (!ring.is_settling() && !ring.guard().is_animating()) {
                return;
            }
        }
        panic!("ring did not settle");
    }

    fn selected_indices(ring: &Ring) -> Vec<usize> {
        ring.items()
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.selected.then_some(i))
            .collect()
    }

    #[test]
    fn test_shortest_arc_range_and_congruence() {
        let mut from = -10.0;
        while from < 10.0 {
            let mut to = -10.0;
            while to < 10.0 {
                let delta = shortest_arc(from, to);
                assert!(delta > -PI && delta <= PI, "delta {delta} out of range");

                let residue = (from + delta - to).rem_euclid(TAU);
                let error = residue.min(TAU - residue);
                assert!(error < 1e-9, "from {from} to {to}: error {error}");

                to += 0.37;
            }
            from += 0.37;
        }
    }

    #[test]
    fn test_shortest_arc_half_turn_is_positive() {
        assert!((shortest_arc(0.0, PI) - PI).abs() < 1e-12);
        assert!((shortest_arc(0.0, -PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_index_from_rotation_exact_quadrant() {
        // N=4, rotation -PI/2 targets index 1 with zero angular error
        assert_eq!(index_from_rotation(-PI / 2.0, 4), 1);
        assert_eq!(index_from_rotation(0.0, 4), 0);
        assert_eq!(index_from_rotation(-PI, 4), 2);
        assert_eq!(index_from_rotation(-3.0 * PI / 2.0, 4), 3);
        // full turn wraps back
        assert_eq!(index_from_rotation(-TAU, 4), 0);
    }

    #[test]
    fn test_index_from_rotation_tie_goes_low() {
        // front angle PI/2 is equidistant from both items of a 2-ring
        assert_eq!(index_from_rotation(-PI / 2.0, 2), 0);
    }

    #[test]
    fn test_select_settles_on_index() {
        for n in [1, 2, 3, 5, 8] {
            for i in 0..n {
                let mut ring = ring_of(n);
                assert!(ring.select_item(i, true), "n={n} i={i}");
                settle(&mut ring);

                assert_eq!(ring.current_index(), i, "n={n}");
                assert_eq!(selected_indices(&ring), vec![i], "n={n}");
                assert!(
                    (ring.rotation() - ring.target_rotation()).abs() < 1e-12,
                    "n={n} i={i}: did not snap exactly"
                );
            }
        }
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let mut ring = ring_of(3);
        assert!(!ring.select_item(3, true));
        assert_eq!(ring.current_index(), 0);
        assert!(!ring.guard().is_animating());
    }

    #[test]
    fn test_second_select_while_animating_is_rejected() {
        let mut ring = ring_of(5);
        assert!(ring.select_item(2, true));
        assert!(ring.guard().is_animating());

        // racing commit never jumps the queue
        assert!(!ring.select_item(4, true));
        ring.tick(DT);
        assert!(!ring.select_item(4, true));

        settle(&mut ring);
        assert_eq!(ring.current_index(), 2);
        assert_eq!(selected_indices(&ring), vec![2]);
        assert!(ring.guard().can_select());
    }

    #[test]
    fn test_snap_select_is_immediate() {
        let mut ring = ring_of(6);
        assert!(ring.select_item(4, false));

        assert_eq!(ring.current_index(), 4);
        assert!(!ring.is_settling());
        assert!(ring.guard().can_select());
        assert!((ring.rotation() - ring.target_rotation()).abs() < 1e-12);
    }

    #[test]
    fn test_next_wraps_around() {
        let mut ring = ring_of(5);

        for expected in [1, 2, 3] {
            assert!(ring.next());
            settle(&mut ring);
            assert_eq!(ring.current_index(), expected);
        }

        assert!(ring.next());
        settle(&mut ring);
        assert_eq!(ring.current_index(), 4);

        assert!(ring.next());
        settle(&mut ring);
        assert_eq!(ring.current_index(), 0);
    }

    #[test]
    fn test_prev_wraps_around() {
        let mut ring = ring_of(5);
        assert!(ring.prev());
        settle(&mut ring);
        assert_eq!(ring.current_index(), 4);
    }

    #[test]
    fn test_next_rejected_while_animating() {
        let mut ring = ring_of(5);
        assert!(ring.next());
        assert!(!ring.next());
        settle(&mut ring);
        assert_eq!(ring.current_index(), 1);
    }

    #[test]
    fn test_spin_commits_only_on_settle() {
        let store = Arc::new(MemorySelectionStore::default());
        let items = (0..4)
            .map(|i| MenuItem::new(ItemLabel::new(format!("item-{i}"))))
            .collect();
        let mut ring = Ring::new(items, Some(store.clone()), 0.2);

        // one step forward; negative rotation brings higher indices frontward
        ring.spin(-ring.angle_step());
        assert!(ring.is_settling());
        assert_eq!(ring.current_index(), 0);

        ring.tick(DT);
        assert_eq!(ring.current_index(), 0, "commit must wait for settle");

        settle(&mut ring);
        assert_eq!(ring.current_index(), 1);
        assert_eq!(store.read(), Some(1));
        assert_eq!(selected_indices(&ring), vec![1]);
    }

    #[test]
    fn test_highlight_follows_without_committing() {
        let mut ring = ring_of(8);
        ring.spin(-3.0 * ring.angle_step());

        let mut saw_highlight_ahead_of_commit = false;
        for _ in 0..600 {
            let report = ring.tick(DT);
            if ring.is_settling() && ring.highlight_index() != ring.current_index() {
                saw_highlight_ahead_of_commit = true;
            }
            if report.settled {
                break;
            }
        }

        assert!(saw_highlight_ahead_of_commit);
        assert_eq!(ring.current_index(), 3);
    }

    #[test]
    fn test_spin_supersedes_target_mid_flight() {
        let mut ring = ring_of(6);
        ring.spin(-ring.angle_step());
        for _ in 0..3 {
            ring.tick(DT);
        }
        // latest target wins; transitions self-correct rather than stack
        ring.spin(-ring.angle_step());
        settle(&mut ring);
        assert_eq!(ring.current_index(), 2);
    }

    #[test]
    fn test_rotation_lock_freezes_animation() {
        let mut ring = ring_of(4);
        assert!(ring.select_item(2, true));
        let before = ring.rotation();

        ring.guard_mut().lock_rotation();
        let report = ring.tick(DT);
        assert!(!report.redraw);
        assert_eq!(ring.rotation(), before);

        ring.guard_mut().unlock_rotation();
        settle(&mut ring);
        assert_eq!(ring.current_index(), 2);
    }

    #[test]
    fn test_spin_inert_while_rotation_locked() {
        let mut ring = ring_of(4);
        ring.guard_mut().lock_rotation();
        ring.spin(-ring.angle_step());
        assert_eq!(ring.target_rotation(), ring.rotation());
    }

    #[test]
    fn test_persisted_index_restored_and_clamped() {
        let store = Arc::new(MemorySelectionStore::with_index(99));
        let items = (0..3)
            .map(|i| MenuItem::new(ItemLabel::new(format!("item-{i}"))))
            .collect();
        let ring = Ring::new(items, Some(store), 0.3);

        assert_eq!(ring.current_index(), 2);
        assert_eq!(selected_indices(&ring), vec![2]);
        assert!(!ring.is_settling());
    }

    #[test]
    fn test_commit_persists_immediately() {
        let store = Arc::new(MemorySelectionStore::default());
        let items = (0..5)
            .map(|i| MenuItem::new(ItemLabel::new(format!("item-{i}"))))
            .collect();
        let mut ring = Ring::new(items, Some(store.clone()), 0.3);

        assert!(ring.select_item(3, true));
        // logical commit is synchronous, the settle is not
        assert_eq!(store.read(), Some(3));
        assert!(ring.is_settling());
    }

    #[test]
    fn test_snap_to_target_completes_in_flight_settle() {
        let mut ring = ring_of(5);
        assert!(ring.select_item(2, true));
        assert!(ring.is_settling());

        ring.snap_to_target();
        assert!(!ring.is_settling());
        assert!(ring.guard().can_select());
        assert_eq!(ring.current_index(), 2);
    }

    #[tokio::test]
    async fn test_settled_signal() {
        let mut ring = ring_of(5);
        ring.settled_signal().wait().await;

        assert!(ring.select_item(2, true));
        let signal = ring.settled_signal();
        settle(&mut ring);
        signal.wait().await;
    }
}
