pub use super::profiles::Entity as Profiles;
pub use super::search_history::Entity as SearchHistory;
