use std::time::Duration;

pub mod carousel;
pub mod guard;
pub mod input;
pub mod ring;
pub mod submenu;
pub mod transition;

pub use carousel::{Carousel, CarouselFrame};
pub use guard::SelectionGuard;
pub use input::{ClickAction, Hit, HoverChange, InteractionResolver, ScrollRoute, Surface};
pub use ring::{MenuItem, Ring, SharedRing, TickReport, index_from_rotation, shortest_arc};
pub use submenu::{SubmenuCoordinator, SubmenuSnapshot};
pub use transition::{SnapDriver, Transition, TransitionDriver, TransitionGate};

/// A ring within this many radians of its target counts as settled.
pub const SNAP_THRESHOLD: f64 = 0.005;
/// Interpolation gain per reference frame toward the target rotation.
pub const DEFAULT_ROTATION_SPEED: f64 = 0.12;
pub const MIN_ROTATION_SPEED: f64 = 0.01;
/// Frame rate the rotation speed is calibrated against.
pub const REFERENCE_FRAME_RATE: f64 = 60.0;
/// Bounded wait for submenu entrance/exit animations; a silent renderer
/// must not wedge the coordinator.
pub const TRANSITION_TIMEOUT: Duration = Duration::from_millis(750);
