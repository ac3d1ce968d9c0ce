use derive_more::Display;
use serde::{Deserialize, Serialize};

pub const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub count: u64,
}

// 整数或字符串形式的ID
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationId {
    #[display(fmt = "{}", _0)]
    Int(i64),
    #[display(fmt = "{}", _0)]
    Str(String),
}

impl From<i64> for NotificationId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl NotificationId {
    // 命令行输入的ID：能解析为整数的按整数处理
    pub fn parse(input: &str) -> Self {
        match input.parse::<i64>() {
            Ok(v) => Self::Int(v),
            Err(_) => Self::Str(input.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListBody {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgementBody {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcknowledgementStatus {
    Success,
    // 后端返回了其他status，附带其说明
    Rejected {
        status: String,
        message: Option<String>,
    },
}

impl AcknowledgementStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<AcknowledgementBody> for AcknowledgementStatus {
    fn from(body: AcknowledgementBody) -> Self {
        if body.status == SUCCESS_STATUS {
            Self::Success
        } else {
            Self::Rejected {
                status: body.status,
                message: body.message,
            }
        }
    }
}
