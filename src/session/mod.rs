pub mod controller;
pub mod events;
pub mod state;

pub use controller::{FrameEffect, GenerationController, SessionRun};
pub use events::SessionEvent;
pub use state::{ProgressTracker, StepState, StepStatus};
