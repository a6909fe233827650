mod chat;
mod history;
mod lookup;
mod regenerate;

pub use chat::cmd_chat;
pub use history::cmd_history;
pub use lookup::{cmd_lookup, cmd_show};
pub use regenerate::cmd_regenerate;
