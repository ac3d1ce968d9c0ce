pub mod notification;
pub mod page;
