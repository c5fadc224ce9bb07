/// Surface module - window presentation surface, negotiation and shared render targets

pub mod negotiation;
pub mod surface_targets;
pub mod window;

pub use surface_targets::{SurfaceTargets, TargetSnapshot};
pub use window::{Window, SurfaceState};
pub(crate) use window::WindowDesc;
