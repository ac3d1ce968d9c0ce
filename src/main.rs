use std::sync::Arc;
use time::macros::format_description;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{fmt::time::LocalTime, EnvFilter};

use notify_bell::config::GLOBAL_CONFIG;
use notify_bell::{HttpNotificationClient, NotificationId, NotificationWidget, Page};

const HELP: &str = "命令: open | check <id> | uncheck <id> | ack-all | show | help | quit";

fn main() {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(GLOBAL_CONFIG.app.thread.max(1))
        .enable_all()
        .build()
        .expect("不能创建tokio运行时")
        .block_on(async_main());
}

async fn async_main() {
    // 设置日志
    tracing_log::LogTracer::init().expect("不能初始化log转发");
    let log_level = match GLOBAL_CONFIG.app.log_level.as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };
    let mut env_filter = EnvFilter::from_default_env().add_directive(log_level.into());
    for directive in ["rustls=info", "hyper=info", "reqwest=info"] {
        if let Ok(v) = directive.parse::<Directive>() {
            env_filter = env_filter.add_directive(v);
        }
    }
    let (stderr, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let subscriber_builder = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(stderr)
        .with_env_filter(env_filter)
        .with_timer(LocalTime::new(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
        )));
    let result = match GLOBAL_CONFIG.app.log_format.as_str() {
        "pretty" => tracing::subscriber::set_global_default(subscriber_builder.pretty().finish()),
        "json" => tracing::subscriber::set_global_default(subscriber_builder.json().finish()),
        _ => tracing::subscriber::set_global_default(subscriber_builder.finish()),
    };
    if let Err(e) = result {
        eprintln!("不能设置日志订阅者: {}", e);
        return;
    }

    if let Err(e) = run_widget().await {
        tracing::error!("{}", e);
    }
}

async fn run_widget() -> std::io::Result<()> {
    let client = match HttpNotificationClient::new(
        GLOBAL_CONFIG.backend.clone(),
        &GLOBAL_CONFIG.page.cookie,
    ) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("创建后端客户端失败: {}", e);
            return Ok(());
        }
    };
    let widget = NotificationWidget::new(
        Arc::new(client),
        Page::from_config(&GLOBAL_CONFIG.page),
        GLOBAL_CONFIG.widget.clone(),
    );
    if !widget.start() {
        return Ok(());
    }
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (None, _) => continue,
            (Some("open"), _) => widget.click_bell(),
            (Some("check"), Some(id)) => {
                widget.set_checkbox(&NotificationId::parse(id), true).await;
            }
            (Some("uncheck"), Some(id)) => {
                widget.set_checkbox(&NotificationId::parse(id), false).await;
            }
            (Some("ack-all"), _) => {
                widget.click_acknowledge_all();
            }
            (Some("show"), _) => {}
            (Some("quit"), _) | (Some("exit"), _) => break,
            _ => {
                println!("{}", HELP);
                continue;
            }
        }
        let page = widget.page();
        print!("{}", page.read().await);
    }

    widget.stop();
    Ok(())
}
