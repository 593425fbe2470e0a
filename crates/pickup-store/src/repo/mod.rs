pub mod collections;
pub mod residents;

pub use collections::{CollectionMove, CollectionNew, CollectionsRepo};
pub use residents::{ResidentNew, ResidentUpdate, ResidentsRepo};
