pub mod editor_state;
pub mod history;
pub mod preferences;
pub mod signals;
