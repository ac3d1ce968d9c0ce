use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::WidgetError;

pub const CONFIG_PATH_ENV: &str = "NOTIFY_BELL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

lazy_static! {
    pub static ref GLOBAL_CONFIG: Config = {
        let file_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Config::new_from_file(&file_path) {
            Ok(v) => v,
            Err(e) => panic!("不能读取配置文件{}: {}", file_path, e),
        }
    };
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub thread: usize,
    pub log_level: String,
    pub log_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thread: 1,
            log_level: "info".to_string(),
            log_format: "default".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub count_path: String,
    pub list_path: String,
    // `{id}` 会被替换为通知ID
    pub mark_as_read_path: String,
    pub mark_all_as_read_path: String,
    pub user_agent: String,
    pub connect_timeout: u64,
    pub whole_timeout: u64,
    pub pool_idle_timeout: u64,
    // 为空时使用系统根证书
    pub root_cert: String,
    pub no_proxy: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            count_path: "/notifications/count/".to_string(),
            list_path: "/notifications/list/".to_string(),
            mark_as_read_path: "/notifications/mark-as-read/{id}/".to_string(),
            mark_all_as_read_path: "/notifications/mark-all-as-read/".to_string(),
            user_agent: concat!("notify_bell/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: 5,
            whole_timeout: 15,
            pool_idle_timeout: 90,
            root_cert: String::new(),
            no_proxy: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WidgetConfig {
    // 单位: 秒
    pub poll_interval: u64,
    // 单位: 毫秒，与淡出动画时长一致
    pub fade_delay_ms: u64,
    pub revert_checkbox_on_failure: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            poll_interval: 30,
            fade_delay_ms: 500,
            revert_checkbox_on_failure: false,
        }
    }
}

impl WidgetConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn fade_delay(&self) -> Duration {
        Duration::from_millis(self.fade_delay_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PageConfig {
    pub cookie: String,
    pub bell: bool,
    pub count_badge: bool,
    pub count_label: bool,
    pub list: bool,
    pub acknowledge_all_link: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            bell: true,
            count_badge: true,
            count_label: true,
            list: true,
            acknowledge_all_link: true,
        }
    }
}

impl Config {
    pub fn new_from_file(file_path: &str) -> Result<Self, WidgetError> {
        let content = std::fs::read_to_string(file_path)?;
        Self::new_from_str(&content)
    }

    pub fn new_from_str(content: &str) -> Result<Self, WidgetError> {
        let config: Self = toml::from_str(content)?;
        if config.widget.poll_interval == 0 {
            return Err(WidgetError::config_err(
                "widget.poll_interval必须大于0",
                "poll_interval = 0",
            ));
        }
        if !config.backend.mark_as_read_path.contains("{id}") {
            return Err(WidgetError::config_err(
                "backend.mark_as_read_path必须包含{id}",
                &config.backend.mark_as_read_path,
            ));
        }
        Ok(config)
    }
}
