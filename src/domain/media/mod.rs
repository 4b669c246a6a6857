//! Media domain module

mod media_format;
mod media_object;

pub use media_format::MediaFormat;
pub use media_object::{file_name_of, key_from_uri, MediaObject};
