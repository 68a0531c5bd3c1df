//! Data models for the gallery.
//!
//! Field names match the JSON written by earlier versions of the gallery so
//! existing `db.json` files load unchanged.

mod comment;
mod document;
mod image;

pub use comment::*;
pub use document::*;
pub use image::*;
