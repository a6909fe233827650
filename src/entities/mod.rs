pub mod prelude;

pub mod profiles;
pub mod search_history;
