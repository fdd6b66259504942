pub mod keyboard;
pub mod pointer;

pub use keyboard::wire_hotspot_toggle_h;
pub use pointer::wire_pointer_handlers;
