pub mod earnings;
pub mod format;
pub mod member_selector;
pub mod payout_manager;
pub mod time;
pub mod validation;
