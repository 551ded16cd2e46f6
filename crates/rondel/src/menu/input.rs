/// Which ring a hit or hover belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Main,
    Submenu,
}

/// Hit-test result handed in by the renderer. The core never computes
/// geometry itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Item { surface: Surface, index: usize },
    CloseAffordance,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Select { surface: Surface, index: usize },
    Close,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRoute {
    Main,
    Submenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverChange {
    pub previous: Option<(Surface, usize)>,
    pub current: Option<(Surface, usize)>,
}

/// Maps raw pointer/wheel/touch input onto logical operations for the
/// active surface. An open submenu always takes input priority over the
/// main ring; the main ring is inert underneath it.
#[derive(Debug, Default)]
pub struct InteractionResolver {
    hovered: Option<(Surface, usize)>,
}

impl InteractionResolver {
    pub fn resolve_click(&self, hit: Hit, submenu_open: bool) -> ClickAction {
        match hit {
            Hit::CloseAffordance => ClickAction::Close,
            // submenu first
            Hit::Item {
                surface: Surface::Submenu,
                index,
            } if submenu_open => ClickAction::Select {
                surface: Surface::Submenu,
                index,
            },
            // stale hit on a submenu that is already logically closed
            Hit::Item {
                surface: Surface::Submenu,
                ..
            } => ClickAction::None,
            Hit::Item {
                surface: Surface::Main,
                index,
            } if !submenu_open => ClickAction::Select {
                surface: Surface::Main,
                index,
            },
            Hit::Item { .. } | Hit::Miss => ClickAction::None,
        }
    }

    /// Scroll goes to exactly one surface, never both.
    pub fn resolve_scroll(&self, submenu_open: bool) -> ScrollRoute {
        if submenu_open {
            ScrollRoute::Submenu
        } else {
            ScrollRoute::Main
        }
    }

    /// Edge-triggered: reports only when the hovered item changed, so
    /// callers don't redo visual work every frame.
    pub fn resolve_hover(&mut self, hit: Hit, submenu_open: bool) -> Option<HoverChange> {
        let current = match hit {
            Hit::Item { surface, index } => {
                let active = matches!(
                    (surface, submenu_open),
                    (Surface::Submenu, true) | (Surface::Main, false)
                );
                active.then_some((surface, index))
            }
            Hit::CloseAffordance | Hit::Miss => None,
        };

        if current == self.hovered {
            return None;
        }
        let change = HoverChange {
            previous: self.hovered,
            current,
        };
        self.hovered = current;
        Some(change)
    }

    pub fn hovered(&self) -> Option<(Surface, usize)> {
        self.hovered
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_routing() {
        let resolver = InteractionResolver::default();

        let cases = vec![
            (
                Hit::Item {
                    surface: Surface::Main,
                    index: 2,
                },
                false,
                ClickAction::Select {
                    surface: Surface::Main,
                    index: 2,
                },
            ),
            // main ring is inert under an open submenu
            (
                Hit::Item {
                    surface: Surface::Main,
                    index: 2,
                },
                true,
                ClickAction::None,
            ),
            (
                Hit::Item {
                    surface: Surface::Submenu,
                    index: 1,
                },
                true,
                ClickAction::Select {
                    surface: Surface::Submenu,
                    index: 1,
                },
            ),
            // stale submenu hit after logical close
            (
                Hit::Item {
                    surface: Surface::Submenu,
                    index: 1,
                },
                false,
                ClickAction::None,
            ),
            (Hit::CloseAffordance, true, ClickAction::Close),
            (Hit::Miss, false, ClickAction::None),
            (Hit::Miss, true, ClickAction::None),
        ];

        for (hit, submenu_open, expected) in cases {
            assert_eq!(
                resolver.resolve_click(hit, submenu_open),
                expected,
                "hit {hit:?} submenu_open {submenu_open}"
            );
        }
    }

    #[test]
    fn test_scroll_routes_to_active_surface() {
        let resolver = InteractionResolver::default();
        assert_eq!(resolver.resolve_scroll(false), ScrollRoute::Main);
        assert_eq!(resolver.resolve_scroll(true), ScrollRoute::Submenu);
    }

    #[test]
    fn test_hover_is_edge_triggered() {
        let mut resolver = InteractionResolver::default();
        let hit = Hit::Item {
            surface: Surface::Main,
            index: 3,
        };

        let change = resolver.resolve_hover(hit, false).unwrap();
        assert_eq!(change.previous, None);
        assert_eq!(change.current, Some((Surface::Main, 3)));

        // same hit again: no edge
        assert_eq!(resolver.resolve_hover(hit, false), None);

        let change = resolver.resolve_hover(Hit::Miss, false).unwrap();
        assert_eq!(change.previous, Some((Surface::Main, 3)));
        assert_eq!(change.current, None);
        assert_eq!(resolver.resolve_hover(Hit::Miss, false), None);
    }

    #[test]
    fn test_hover_ignores_inactive_surface() {
        let mut resolver = InteractionResolver::default();
        let main_hit = Hit::Item {
            surface: Surface::Main,
            index: 0,
        };

        // main hover while a submenu is open resolves to nothing
        assert_eq!(resolver.resolve_hover(main_hit, true), None);

        let sub_hit = Hit::Item {
            surface: Surface::Submenu,
            index: 1,
        };
        let change = resolver.resolve_hover(sub_hit, true).unwrap();
        assert_eq!(change.current, Some((Surface::Submenu, 1)));
    }
}
