use derive_more::{Display, Error};

pub const REQUEST_ERR: u16 = 1;
pub const DECODE_ERR: u16 = 2;
pub const CONFIG_ERR: u16 = 3;
pub const REQWEST_SEND_ERR: u16 = 501;
pub const JSON_ERR: u16 = 502;
pub const REQWEST_DECODE_ERR: u16 = 503;
pub const TOML_ERR: u16 = 504;
pub const IO_ERR: u16 = 505;

#[derive(Debug, Display, Error)]
#[display(
    fmt = "{{err_code: {}, err_message: {}, internal_message: {}}}",
    err_code,
    err_message,
    internal_message
)]
pub struct WidgetError {
    pub err_code: u16,
    pub err_message: String,
    pub internal_message: String,
}

impl WidgetError {
    // 请求未能完成（连接失败、超时等）
    pub fn request_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: REQUEST_ERR,
            err_message: format!("请求后端失败: {}", err_message),
            internal_message: internal_message.to_string(),
        }
    }

    // 响应体无法解析
    pub fn decode_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: DECODE_ERR,
            err_message: format!("响应内容无法解析: {}", err_message),
            internal_message: internal_message.to_string(),
        }
    }

    pub fn config_err(err_message: &str, internal_message: &str) -> Self {
        Self {
            err_code: CONFIG_ERR,
            err_message: format!("配置不正确: {}", err_message),
            internal_message: internal_message.to_string(),
        }
    }

    pub fn is_request_err(&self) -> bool {
        self.err_code == REQUEST_ERR || self.err_code == REQWEST_SEND_ERR
    }

    pub fn is_decode_err(&self) -> bool {
        matches!(self.err_code, DECODE_ERR | JSON_ERR | REQWEST_DECODE_ERR)
    }
}

impl From<reqwest::Error> for WidgetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self {
                err_code: REQWEST_DECODE_ERR,
                err_message: "响应内容不是合法的JSON".to_string(),
                internal_message: format!("reqwest解码错误: {}", error),
            };
        }
        Self {
            err_code: REQWEST_SEND_ERR,
            err_message: "发送请求失败，请稍后重试".to_string(),
            internal_message: format!("reqwest未处理错误: {}", error),
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            err_code: JSON_ERR,
            err_message: "响应内容不是合法的JSON".to_string(),
            internal_message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for WidgetError {
    fn from(error: toml::de::Error) -> Self {
        Self {
            err_code: TOML_ERR,
            err_message: "配置文件格式不正确".to_string(),
            internal_message: error.to_string(),
        }
    }
}

impl From<std::io::Error> for WidgetError {
    fn from(error: std::io::Error) -> Self {
        Self {
            err_code: IO_ERR,
            err_message: "读取文件失败".to_string(),
            internal_message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_messages() {
        let err = WidgetError::request_err("计数", "连接被拒绝");
        assert_eq!(
            err.to_string(),
            "{err_code: REQUEST_ERR, err_message: 请求后端失败: 计数, internal_message: 连接被拒绝}"
        );
        assert!(err.is_request_err());
        assert!(!err.is_decode_err());
    }

    #[test]
    fn json_errors_are_decode_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: WidgetError = json_err.into();
        assert!(err.is_decode_err());
    }
}
