pub mod clock;
pub mod donor_repository;

pub use clock::*;
pub use donor_repository::*;
