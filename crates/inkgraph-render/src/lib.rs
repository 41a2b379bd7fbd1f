//! InkGraph Render Library
//!
//! Renderer abstraction for InkGraph documents. Concrete backends implement
//! [`Renderer`]; [`RecordingRenderer`] captures draw calls for tests and the
//! headless app.

mod decorator;
mod recording;
mod renderer;

pub use decorator::{HANDLE_SIZE, SelectionDecorator, draw_canvas};
pub use recording::{DrawCommand, RecordingRenderer};
pub use renderer::{
    HandleKind, Placement, RenderResult, Renderer, RendererError, draw_document, draw_shape, draw_shapes,
    draw_templates,
};
