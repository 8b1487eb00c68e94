pub mod directory;

pub use directory::{InMemoryPlayerDirectory, PlayerLookup, PlayerProfile};
