pub mod repository;

pub use repository::PreferenceRepository;
