//! Track library: filename parsing, natural ordering, the `Track` and
//! `FileHandle` model and directory scanning.

mod filename;
mod model;
mod natural;
mod scan;

pub use filename::{TrackMeta, parse_filename};
pub use model::*;
pub use natural::natural_cmp;
pub use scan::{is_audio_name, normalize_extensions, scan_dir};
