pub mod kind;
pub mod model;
pub mod repo;
pub mod validate;

pub use kind::{ContentKind, ContentRef};
pub use model::{Content, Genre, Movie, Series};
pub use repo::ContentRepo;
