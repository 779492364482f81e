//! Starfield Core Library - Procedural star field generation and animation
//!
//! This library provides the engine-agnostic core of the star field backdrop:
//! random point clouds, time-driven layer transforms, pointer parallax and
//! camera projection. Renderers plug in through [`RenderSurface`] and drive
//! frames through [`FrameClock`].

pub mod animator;
pub mod config;
pub mod input;
pub mod parallax;
pub mod points;
pub mod projection;
pub mod scene;
pub mod scheduler;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use animator::{FrameAnimator, FrameTransforms, TimeState};
pub use config::{ConfigError, StarFieldConfig};
pub use input::{InputBus, InputEvent, Subscription, Viewport};
pub use parallax::{PointerParallaxTracker, PointerState};
pub use points::{PointCloud, PointSet, MAX_COUNT};
pub use projection::{Camera, ScreenPoint};
pub use scene::StarField;
pub use scheduler::{FrameClock, FrameHandler, FrameTick};
pub use surface::{Layer, LayerSnapshot, PointStyle, RenderSurface, RetainedLayers};
pub use transform::{RotationState, Transform};
