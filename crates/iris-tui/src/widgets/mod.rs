//! Custom widgets for the chat screen

pub mod analysis_panel;
pub mod history_panel;
pub mod input_box;
pub mod message_list;
pub mod selector;
pub mod spinner;

pub use analysis_panel::{AnalysisPanel, AnalysisView};
pub use history_panel::{HistoryCursor, HistoryPanel};
pub use input_box::InputBox;
pub use message_list::{ChatLine, LineKind, MessageList, calculate_message_height};
pub use selector::{Selector, SelectorItem, SelectorState};
pub use spinner::{Activity, Spinner};
