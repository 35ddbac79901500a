//! Audio output: the `AudioOutput` seam used by the player and its `rodio`
//! implementation running on a dedicated thread.

mod output;
mod sink;
mod thread;
mod types;

pub use output::RodioOutput;
pub use types::*;
