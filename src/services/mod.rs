pub mod click_service;
pub mod drag_service;
pub mod listing_service;
pub mod mutation_service;
pub mod notification_service;
pub mod pin_signal;
pub mod quick_access_service;
