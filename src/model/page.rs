use std::fmt;

use crate::config::PageConfig;
use crate::model::notification::{Notification, NotificationId};

pub const BELL_ID: &str = "notification-bell";
pub const COUNT_BADGE_ID: &str = "notification-count-badge";
pub const COUNT_LABEL_ID: &str = "notification-count";
pub const LIST_ID: &str = "notification-list";
pub const ACKNOWLEDGE_ALL_LINK_ID: &str = "acknowledge-all-link";

pub const EMPTY_PLACEHOLDER: &str = "No unread notifications.";
pub const ERROR_PLACEHOLDER: &str = "Could not load notifications.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bell;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Badge {
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountLabel {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcknowledgeAllLink {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub notification: Notification,
    pub checked: bool,
    pub fading: bool,
}

impl NotificationItem {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            checked: false,
            fading: false,
        }
    }

    pub fn id(&self) -> &NotificationId {
        &self.notification.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Notification(NotificationItem),
    Placeholder(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationList {
    items: Vec<ListItem>,
}

impl NotificationList {
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &NotificationItem> {
        self.items.iter().filter_map(|item| match item {
            ListItem::Notification(v) => Some(v),
            ListItem::Placeholder(_) => None,
        })
    }

    pub fn unread_len(&self) -> usize {
        self.notifications().count()
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self.items.as_slice() {
            [ListItem::Placeholder(text)] => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn item(&self, id: &NotificationId) -> Option<&NotificationItem> {
        self.notifications().find(|v| v.id() == id)
    }

    pub fn item_mut(&mut self, id: &NotificationId) -> Option<&mut NotificationItem> {
        self.items.iter_mut().find_map(|item| match item {
            ListItem::Notification(v) if v.id() == id => Some(v),
            _ => None,
        })
    }

    pub fn replace_with(&mut self, notifications: Vec<Notification>) -> usize {
        self.items = notifications
            .into_iter()
            .map(|n| ListItem::Notification(NotificationItem::new(n)))
            .collect();
        self.items.len()
    }

    pub fn show_placeholder(&mut self, text: &str) {
        self.items = vec![ListItem::Placeholder(text.to_string())];
    }

    pub fn remove(&mut self, id: &NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| match item {
            ListItem::Notification(v) => v.id() != id,
            ListItem::Placeholder(_) => true,
        });
        before != self.items.len()
    }

    pub fn fade_all(&mut self) -> usize {
        let mut faded = 0;
        for item in self.items.iter_mut() {
            if let ListItem::Notification(v) = item {
                v.fading = true;
                faded += 1;
            }
        }
        faded
    }
}

// 除铃铛外的挂载点都是可选的，缺失时跳过
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub cookie: String,
    pub bell: Option<Bell>,
    pub count_badge: Option<Badge>,
    pub count_label: Option<CountLabel>,
    pub list: Option<NotificationList>,
    pub acknowledge_all_link: Option<AcknowledgeAllLink>,
}

impl Page {
    pub fn full(cookie: &str) -> Self {
        Self {
            cookie: cookie.to_string(),
            bell: Some(Bell),
            count_badge: Some(Badge::default()),
            count_label: Some(CountLabel::default()),
            list: Some(NotificationList::default()),
            acknowledge_all_link: Some(AcknowledgeAllLink::default()),
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            cookie: config.cookie.clone(),
            bell: config.bell.then(|| Bell),
            count_badge: config.count_badge.then(Badge::default),
            count_label: config.count_label.then(CountLabel::default),
            list: config.list.then(NotificationList::default),
            acknowledge_all_link: config.acknowledge_all_link.then(AcknowledgeAllLink::default),
        }
    }

    pub fn has_bell(&self) -> bool {
        self.bell.is_some()
    }

    pub fn missing_anchors(&self) -> Vec<&'static str> {
        let anchors = [
            (self.count_badge.is_some(), COUNT_BADGE_ID),
            (self.count_label.is_some(), COUNT_LABEL_ID),
            (self.list.is_some(), LIST_ID),
            (self.acknowledge_all_link.is_some(), ACKNOWLEDGE_ALL_LINK_ID),
        ];
        anchors
            .iter()
            .filter(|(present, _)| !present)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn badge_visible(&self) -> bool {
        self.count_badge.as_ref().map_or(false, |v| v.visible)
    }

    pub fn count_text(&self) -> Option<&str> {
        self.count_label.as_ref().map(|v| v.text.as_str())
    }

    pub fn acknowledge_all_visible(&self) -> bool {
        self.acknowledge_all_link
            .as_ref()
            .map_or(false, |v| v.visible)
    }

    pub fn set_count(&mut self, count: u64) {
        if count > 0 {
            if let Some(label) = self.count_label.as_mut() {
                label.text = count.to_string();
            }
            self.set_badge_visible(true);
        } else {
            self.set_badge_visible(false);
        }
    }

    pub fn set_badge_visible(&mut self, visible: bool) {
        if let Some(badge) = self.count_badge.as_mut() {
            badge.visible = visible;
        }
    }

    pub fn set_acknowledge_all_visible(&mut self, visible: bool) {
        if let Some(link) = self.acknowledge_all_link.as_mut() {
            link.visible = visible;
        }
    }

    pub fn show_empty(&mut self) {
        if let Some(list) = self.list.as_mut() {
            list.show_placeholder(EMPTY_PLACEHOLDER);
        }
        self.set_acknowledge_all_visible(false);
    }

    pub fn show_load_error(&mut self) {
        if let Some(list) = self.list.as_mut() {
            list.show_placeholder(ERROR_PLACEHOLDER);
        }
        self.set_acknowledge_all_visible(false);
    }

    pub fn show_notifications(&mut self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            self.show_empty();
            return;
        }
        let rendered = match self.list.as_mut() {
            Some(list) => list.replace_with(notifications),
            None => 0,
        };
        self.set_acknowledge_all_visible(rendered > 0);
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_bell() {
            return writeln!(f, "(#{} 不存在)", BELL_ID);
        }
        match (self.badge_visible(), self.count_text()) {
            (true, Some(text)) => writeln!(f, "[铃铛] 未读: {}", text)?,
            (true, None) => writeln!(f, "[铃铛] 有未读")?,
            (false, _) => writeln!(f, "[铃铛]")?,
        }
        for id in self.missing_anchors() {
            writeln!(f, "  (#{} 不存在)", id)?;
        }
        if let Some(list) = self.list.as_ref() {
            for item in list.items() {
                match item {
                    ListItem::Notification(v) => writeln!(
                        f,
                        "  [{}] #{} {}  ({}){}",
                        if v.checked { "x" } else { " " },
                        v.id(),
                        v.notification.message,
                        v.notification.created_at,
                        if v.fading { " ..." } else { "" }
                    )?,
                    ListItem::Placeholder(text) => writeln!(f, "  {}", text)?,
                }
            }
        }
        if self.acknowledge_all_visible() {
            writeln!(f, "  <全部标记为已读>")?;
        }
        Ok(())
    }
}
