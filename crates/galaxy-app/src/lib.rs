//! Galaxy viewer application: the render loop driver, the parameter panel,
//! and the winit shell that ties them to the GPU renderer.

pub mod clock;
pub mod controls;
pub mod driver;
pub mod panel;
pub mod window;

pub use clock::{FrameClock, FrameTiming, MAX_FRAME_TIME};
pub use controls::{ControlKind, ControlSpec, FinishAction, GALAXY_CONTROLS, ParamField, control_for};
pub use driver::{DriverState, GalaxyDriver};
pub use panel::{PanelEvent, ParameterPanel};
pub use window::{AppError, GalaxyApp, run_with_config};
