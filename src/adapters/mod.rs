pub mod clock;
pub mod mock;
pub mod postgres;
