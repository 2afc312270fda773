//! Release name parsing.
//!
//! Scene release titles pack the movie name together with language,
//! resolution, codec, audio and release-group tags. This module extracts
//! the searchable title, the year and a documentary flag from them.

mod parser;

pub use parser::{parse, ParsedRelease};
