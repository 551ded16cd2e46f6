/// Completion signal for one externally driven animation.
///
/// The renderer hands one of these out per entrance/exit animation and
/// fires the matching [`TransitionGate`] when the animation finishes. A
/// dropped gate counts as finished so a dead renderer can never wedge the
/// submenu coordinator.
pub struct Transition(Option<async_channel::Receiver<()>>);

impl Transition {
    /// Already complete. For snap transitions and embedders without
    /// animations.
    pub fn ready() -> Self {
        Self(None)
    }

    pub fn gated() -> (TransitionGate, Self) {
        let (tx, rx) = async_channel::bounded(1);
        (TransitionGate(tx), Self(Some(rx)))
    }

    pub async fn wait(self) {
        if let Some(rx) = self.0 {
            // Err means the gate was dropped; treat as complete.
            let _ = rx.recv().await;
        }
    }
}

pub struct TransitionGate(async_channel::Sender<()>);

impl TransitionGate {
    pub fn complete(self) {
        let _ = self.0.try_send(());
    }
}

/// Renderer-side collaborator playing submenu entrance/exit animations.
pub trait TransitionDriver: Send + Sync {
    fn submenu_enter(&self, parent_index: usize, item_count: usize) -> Transition;
    fn submenu_exit(&self, item_count: usize) -> Transition;
}

/// Driver with no animations; every transition completes immediately.
pub struct SnapDriver;

impl TransitionDriver for SnapDriver {
    fn submenu_enter(&self, _parent_index: usize, _item_count: usize) -> Transition {
        Transition::ready()
    }

    fn submenu_exit(&self, _item_count: usize) -> Transition {
        Transition::ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_transition_completes() {
        Transition::ready().wait().await;
    }

    #[tokio::test]
    async fn test_gated_transition_completes_on_gate() {
        let (gate, transition) = Transition::gated();
        gate.complete();
        transition.wait().await;
    }

    #[tokio::test]
    async fn test_dropped_gate_counts_as_complete() {
        let (gate, transition) = Transition::gated();
        drop(gate);
        transition.wait().await;
    }
}
