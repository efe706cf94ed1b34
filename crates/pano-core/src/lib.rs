//! Camera-orientation input fusion and adaptive render quality for a
//! panoramic image viewer.
//!
//! Everything here is platform independent: raw pointer, key and sensor
//! records go in, a clamped [`Orientation`] and [`QualitySettings`] come out.
//! The browser front-end lives in `pano-web`.

pub mod constants;
pub mod controller;
pub mod device;
pub mod error;
pub mod gesture;
pub mod inertia;
pub mod keys;
pub mod perf;
pub mod quality;
pub mod timer;
pub mod viewer;

pub use constants::*;
pub use controller::*;
pub use device::*;
pub use error::*;
pub use gesture::*;
pub use inertia::*;
pub use keys::*;
pub use perf::*;
pub use quality::*;
pub use timer::*;
pub use viewer::*;
