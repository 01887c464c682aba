pub mod model;
pub mod repo;
pub mod resolver;

pub use model::{Section, SectionItem, SectionType, SelectionStrategy};
pub use repo::{CreateSection, SectionRepo, UpdateSection};
pub use resolver::{resolve_section, ResolvedEntry};
