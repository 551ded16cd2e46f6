use crate::menu::input::Hit;

#[derive(Debug, Clone)]
pub enum MenuEvent {
    Click(Hit),
    Wheel(f64),
    Swipe { delta: f64, magnitude: f64 },
    Hover(Hit),
    Next,
    Prev,
    Select(usize),
    CloseSubmenu,
    ConfigReload,
}
