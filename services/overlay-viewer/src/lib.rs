//! Wind overlay viewer.
//!
//! Wires the overlay crates into a session: a controller that reacts to
//! viewport, date, level and opacity triggers, the render surface and status
//! collaborators it draws through, YAML configuration and viewport debouncing.

pub mod config;
pub mod debounce;
pub mod loader;
pub mod session;
pub mod surface;

pub use config::ViewerConfig;
pub use debounce::ViewportDebouncer;
pub use loader::{load_features, LoadedFeatures};
pub use session::{LevelRender, RenderOutcome, SessionController, TriggerEffects};
pub use surface::{GeoJsonSurface, ImageryState, RenderSurface, StatusLog, StatusSink};
