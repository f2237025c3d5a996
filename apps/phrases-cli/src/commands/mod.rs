pub mod inspect;
pub mod phrases;
pub mod seed;

pub use inspect::InspectArgs;
pub use seed::SeedArgs;
