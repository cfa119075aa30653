pub mod use_debounce;
pub mod use_persisted;

pub use use_debounce::{use_debounce, DEFAULT_DEBOUNCE_MS};
pub use use_persisted::use_persisted;
