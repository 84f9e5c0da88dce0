//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod decoder;
mod input_source;
mod progress;
mod renderer;
mod result_output;

pub use decoder::RasterDecoder;
pub use input_source::{InputError, InputSource};
pub use progress::{ProgressEvent, ProgressSink};
pub use renderer::{PageRenderer, PageSource, RenderedPage};
pub use result_output::ResultOutput;
