pub mod enums;
pub mod forms;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::TradeType;
pub use forms::{FieldErrors, NewTradeForm, NoteForm, NumericInput, SignInForm, SignUpForm};
pub use structs::{Note, Trade, calculate_pnl};
