pub mod progress;
pub mod renderer;
