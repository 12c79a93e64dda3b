pub mod emitter;
pub mod naming;
pub mod renderer;

pub use emitter::{FileEmitter, GeneratedFile};
pub use renderer::{ClassRenderer, RenderedEntity};
