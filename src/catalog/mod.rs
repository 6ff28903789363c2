mod album;
mod artist;
mod catalog;
mod genre;
mod load;
mod recording;

pub use album::Album;
pub use artist::Artist;
pub use catalog::{Catalog, Problem as LoadCatalogProblem};
pub use genre::Genre;
pub use load::load_catalog;
pub use recording::{AudioFormat, AudioInfo, Platform, PlatformLink, Recording};

#[cfg(test)]
pub use catalog::test_fixtures;
