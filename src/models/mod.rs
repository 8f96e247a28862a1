pub mod entry;
pub mod listing;
pub mod operation;
pub mod quick_access;
