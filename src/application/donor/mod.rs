mod donor_service;
mod errors;
pub mod report;

pub use donor_service::{
    ServiceDependencies, donation_window, export_csv, get_donor, list_donors, register_donor,
    summarize_by_blood_group, update_donor,
};
pub use errors::{DonorApplicationError, Result};
pub use report::BloodGroupSummary;
