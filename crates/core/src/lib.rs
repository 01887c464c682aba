//! Core domain logic for the flimix landing-page backend: the content
//! registry (movies, series, genres), sections with manual/automatic
//! selection, landing pages, and the assembly of the page document served
//! to the presentation client.

pub mod content;
pub mod error;
pub mod page;
pub mod section;

pub use error::{CoreError, Result};
