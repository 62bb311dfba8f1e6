//! Input-side mention handling: the `@` composer and the lead picker it drives

pub mod mention_input;
pub mod picker;

pub use mention_input::{Key, KeyOutcome, KeyPress, MentionComposer, PickerTrigger};
pub use picker::{fetch_candidates, filter, LeadPicker, LoadTicket, PickerView};
