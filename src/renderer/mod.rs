//! CPU pixel rendering
//!
//! Every visualizer draws into a small `PixelBuffer` and is stretched to the
//! display with nearest-neighbor sampling. HUD text and widgets are drawn at
//! display resolution on top.

pub mod cross_section;
pub mod deflection_view;
pub mod font;
pub mod framebuffer;
pub mod hud;
pub mod interference_view;
pub mod lidar;
pub mod orbit_diagram;
pub mod orbit_view;
pub mod world_view;

pub use cross_section::render_cross_section;
pub use deflection_view::DeflectionView;
pub use framebuffer::{PixelBuffer, Rgba, colors};
pub use interference_view::InterferenceView;
pub use lidar::render_lidar;
pub use orbit_diagram::{OrbitDiagramParams, render_orbit_diagram};
pub use orbit_view::OrbitView;
pub use world_view::WorldView;
