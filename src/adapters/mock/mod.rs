pub mod clock;
pub mod donor_repository;

pub use clock::FixedClock;
pub use donor_repository::DonorRepository;
