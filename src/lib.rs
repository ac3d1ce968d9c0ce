pub mod config;
pub mod error;
pub mod model;
pub mod notification_client;
pub mod util;
pub mod widget;

pub use error::WidgetError;
pub use model::notification::{Notification, NotificationId, NotificationSummary};
pub use model::page::Page;
pub use notification_client::{HttpNotificationClient, NotificationApi};
pub use widget::NotificationWidget;
