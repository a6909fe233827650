pub mod history;
pub mod profile;

pub use history::SearchHistoryEntry;
pub use profile::{BioLink, Post, ProfileRecord, ProfileSnapshot};
