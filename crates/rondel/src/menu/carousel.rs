use crate::config::{ItemConfig, MenuConfig, WheelMode};
use crate::events::MenuEvent;
use crate::menu::input::{ClickAction, Hit, HoverChange, InteractionResolver, ScrollRoute, Surface};
use crate::menu::ring::{MenuItem, Ring, SharedRing, TickReport};
use crate::menu::submenu::SubmenuCoordinator;
use crate::menu::transition::TransitionDriver;
use crate::persist::SelectionStore;
use parking_lot::Mutex;
use std::sync::Arc;
use vitrine::catalog::{self, ItemLabel};

/// Per-frame output for the renderer: one report per live ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarouselFrame {
    pub main: TickReport,
    pub submenu: Option<TickReport>,
}

/// One main ring plus its exclusive submenu, with input routed between
/// them. This is the embedder's single entry point; the renderer drives
/// [`Carousel::tick`] once per frame and feeds events as they arrive.
pub struct Carousel {
    main: SharedRing,
    resolver: InteractionResolver,
    coordinator: Arc<SubmenuCoordinator>,
    wheel: WheelMode,
}

impl Carousel {
    pub fn new(
        items: Vec<MenuItem>,
        store: Option<Arc<dyn SelectionStore>>,
        driver: Arc<dyn TransitionDriver>,
        rotation_speed: f64,
        wheel: WheelMode,
    ) -> Self {
        let main = Arc::new(Mutex::new(Ring::new(items, store, rotation_speed)));
        let coordinator = Arc::new(SubmenuCoordinator::new(
            main.clone(),
            driver,
            rotation_speed,
        ));
        Self {
            main,
            resolver: InteractionResolver::default(),
            coordinator,
            wheel,
        }
    }

    pub fn from_config(
        config: &MenuConfig,
        store: Option<Arc<dyn SelectionStore>>,
        driver: Arc<dyn TransitionDriver>,
    ) -> Self {
        let mut items = build_items(&config.items);
        if items.is_empty() {
            items.push(MenuItem::new(ItemLabel::new("Empty")));
        }
        Self::new(items, store, driver, config.rotation_speed, config.wheel)
    }

    pub fn main_ring(&self) -> SharedRing {
        self.main.clone()
    }

    pub fn submenu(&self) -> Arc<SubmenuCoordinator> {
        self.coordinator.clone()
    }

    pub async fn apply(&mut self, event: MenuEvent) {
        match event {
            MenuEvent::Click(hit) => {
                self.handle_click(hit).await;
            }
            MenuEvent::Wheel(delta) => self.handle_wheel(delta),
            MenuEvent::Swipe { delta, magnitude } => self.handle_swipe(delta, magnitude),
            MenuEvent::Hover(hit) => {
                self.handle_hover(hit);
            }
            MenuEvent::Next => {
                if let Some(ring) = self.active_input_ring() {
                    ring.lock().next();
                }
            }
            MenuEvent::Prev => {
                if let Some(ring) = self.active_input_ring() {
                    ring.lock().prev();
                }
            }
            MenuEvent::Select(index) => {
                if let Some(ring) = self.active_input_ring() {
                    ring.lock().select_item(index, true);
                }
            }
            MenuEvent::CloseSubmenu => {
                if self.coordinator.close().await {
                    self.resolver.clear_hover();
                }
            }
            // rebuilt by the embedder, which owns config and catalog
            MenuEvent::ConfigReload => log::debug!("config reload left to the embedder"),
        }
    }

    pub async fn handle_click(&mut self, hit: Hit) -> ClickAction {
        let action = self.resolver.resolve_click(hit, self.coordinator.is_open());
        match action {
            ClickAction::Select {
                surface: Surface::Main,
                index,
            } => {
                let submenu_items = {
                    let mut main = self.main.lock();
                    if !main.select_item(index, true) {
                        return ClickAction::None;
                    }
                    main.item(index)
                        .map(|item| item.submenu_items())
                        .unwrap_or_default()
                };
                if !submenu_items.is_empty() {
                    self.coordinator.open(index, submenu_items).await;
                    self.resolver.clear_hover();
                }
            }
            ClickAction::Select {
                surface: Surface::Submenu,
                index,
            } => {
                // inert while the submenu is still entering or leaving
                if let Some(ring) = self.active_input_ring() {
                    ring.lock().select_item(index, true);
                }
            }
            ClickAction::Close => {
                if self.coordinator.close().await {
                    self.resolver.clear_hover();
                }
            }
            ClickAction::None => {}
        }
        action
    }

    /// One wheel tick. Steps or free-spins the active surface depending on
    /// the configured wheel mode; positive delta moves forward.
    pub fn handle_wheel(&mut self, delta: f64) {
        if delta == 0.0 {
            return;
        }
        match self.resolver.resolve_scroll(self.coordinator.is_open()) {
            ScrollRoute::Submenu => {
                if let Some(ring) = self.active_input_ring() {
                    wheel_ring(&mut ring.lock(), delta, self.wheel);
                }
            }
            ScrollRoute::Main => {
                if self.transition_in_flight() {
                    return;
                }
                wheel_ring(&mut self.main.lock(), delta, self.wheel);
            }
        }
    }

    /// Continuous swipe tracking: `delta` is signed item-steps, `magnitude`
    /// the gesture strength. Tracks the latest target; the commit happens
    /// on settle.
    pub fn handle_swipe(&mut self, delta: f64, magnitude: f64) {
        if let Some(ring) = self.active_input_ring() {
            let mut ring = ring.lock();
            let angle = -delta * magnitude * ring.angle_step();
            ring.spin(angle);
        }
    }

    pub fn handle_hover(&mut self, hit: Hit) -> Option<HoverChange> {
        self.resolver.resolve_hover(hit, self.coordinator.is_open())
    }

    /// Advances both live rings; their state is disjoint, so order within
    /// the frame does not matter.
    pub fn tick(&mut self, dt: f64) -> CarouselFrame {
        let main = self.main.lock().tick(dt);
        let submenu = self.coordinator.active_ring().map(|ring| ring.lock().tick(dt));
        CarouselFrame { main, submenu }
    }

    fn transition_in_flight(&self) -> bool {
        let snapshot = self.coordinator.snapshot();
        if snapshot.is_opening || snapshot.is_closing {
            log::debug!("input rejected: submenu transition in flight");
            return true;
        }
        false
    }

    /// The ring discrete input should act on right now, if any.
    fn active_input_ring(&self) -> Option<SharedRing> {
        if self.transition_in_flight() {
            return None;
        }
        if self.coordinator.is_open() {
            self.coordinator.active_ring()
        } else {
            Some(self.main.clone())
        }
    }
}

fn wheel_ring(ring: &mut Ring, delta: f64, mode: WheelMode) {
    if !ring.guard().can_scroll() {
        log::debug!("wheel rejected: guard busy");
        return;
    }
    match mode {
        WheelMode::Step => {
            if delta > 0.0 {
                ring.next();
            } else {
                ring.prev();
            }
        }
        // negative rotation brings higher indices frontward
        WheelMode::Free => {
            let angle = -delta * ring.angle_step();
            ring.spin(angle);
        }
    }
}

fn build_items(configs: &[ItemConfig]) -> Vec<MenuItem> {
    configs.iter().map(build_item).collect()
}

fn build_item(cfg: &ItemConfig) -> MenuItem {
    let entry = cfg.product.as_ref().and_then(catalog::find_entry);

    let mut item = match entry {
        Some(entry) => MenuItem::from_entry(entry),
        None => {
            let label = cfg
                .label
                .clone()
                .or_else(|| cfg.product.as_ref().map(|p| ItemLabel::new(p.to_string())))
                .unwrap_or_else(|| ItemLabel::new("Unnamed"));
            MenuItem::new(label)
        }
    };

    // explicit config wins over catalog data
    if let Some(label) = &cfg.label {
        item.label = label.clone();
    }
    if !cfg.submenu.is_empty() {
        item.children = build_items(&cfg.submenu);
    }
    item
}
