pub mod profile;

pub use profile::normalize_payload;
