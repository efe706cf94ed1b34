pub mod device;
pub mod keyboard;
pub mod pointer;

pub use device::{request_orientation_permission, wire_device_orientation};
pub use keyboard::wire_keyboard;
pub use pointer::wire_pointer_handlers;
