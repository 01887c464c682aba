pub mod assemble;
pub mod model;
pub mod repo;

pub use assemble::{assemble, PageDocument};
pub use model::{LandingPage, LandingPageSection};
pub use repo::PageRepo;
