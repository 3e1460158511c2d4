pub mod donor;
pub mod eligibility;
pub mod errors;
pub mod value_objects;

pub use donor::*;
pub use eligibility::{DonationWindow, EligibilityPolicy};
pub use errors::*;
pub use value_objects::*;
