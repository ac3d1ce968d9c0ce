mod widget_error;

pub use widget_error::{
    WidgetError, CONFIG_ERR, DECODE_ERR, IO_ERR, JSON_ERR, REQUEST_ERR, REQWEST_DECODE_ERR,
    REQWEST_SEND_ERR, TOML_ERR,
};
