pub mod about;
pub mod app;
pub mod cli;
pub mod detail;
pub mod error;
pub mod hover;
pub mod loader;
pub mod minimap;
pub mod overview;
pub mod paint;
pub mod ribbon_state;
pub mod selection;
pub mod settings;
pub mod viewport;

pub use error::ViewerError;
pub use overview::SyntenyOverview;
pub use settings::{ViewerSettings, ZoomConfig};
pub use viewport::{PanDirection, SharedViewport, ViewKey, ViewportController};
