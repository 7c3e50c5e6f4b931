//! Request extractors shared by the entity handlers.

mod list_format;
pub use list_format::ListFormat;
