//! Headless scene building for synteny views: scales, layout, chromosome
//! glyphs, ribbons, the radial detail scene and static export.

pub mod chromosome;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod overview;
pub mod radial;
pub mod ribbon;
pub mod scale;
pub mod scene;
pub mod theme;

pub use export::{CancelToken, ExportError, ExportFormat, ExportOptions};
pub use geometry::{PathData, Point, Rect};
pub use layout::{AnnotationConfig, LayoutConfig, OverviewLayout};
pub use overview::{build_overview, OverviewOptions, OverviewScene, RenderedRibbon};
pub use radial::{RadialConfig, RadialInput, RadialScene};
pub use ribbon::{RibbonColors, RibbonNodes, RibbonStyle};
pub use scale::{AngularScale, LinearScale};
pub use scene::{Interaction, NodeId, NodeKind, Paint, Scene, SceneEvent, Style};
pub use theme::{SpeciesColors, Theme};
