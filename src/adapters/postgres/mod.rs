pub mod donor_repository;

// パブリックに型を再エクスポート
pub use donor_repository::DonorRepository as PostgresDonorRepository;
