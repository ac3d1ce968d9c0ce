use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::config::WidgetConfig;
use crate::model::notification::{AcknowledgementStatus, NotificationId};
use crate::model::page::Page;
use crate::notification_client::NotificationApi;
use crate::util::cookie::get_csrf_token;

// 同类请求的序号，只应用最新发出的那次请求的结果
#[derive(Default)]
struct Sequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl Sequencer {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    // 必须在持有页面写锁时调用
    fn try_apply(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::SeqCst) < seq
    }
}

struct WidgetCore {
    api: Arc<dyn NotificationApi>,
    page: Arc<RwLock<Page>>,
    csrf_token: Option<String>,
    config: WidgetConfig,
    count_seq: Sequencer,
    list_seq: Sequencer,
}

impl WidgetCore {
    async fn refresh_count(&self) {
        let seq = self.count_seq.issue();
        let result = self.api.fetch_count().await;
        match result {
            Ok(summary) => {
                let mut page = self.page.write().await;
                if !self.count_seq.try_apply(seq) {
                    tracing::debug!("丢弃过期的通知数量响应, 序号: {}", seq);
                    return;
                }
                page.set_count(summary.count);
                tracing::debug!("未读通知数量: {}", summary.count);
            }
            Err(e) => tracing::error!("获取通知数量失败: {}", e),
        }
    }

    async fn refresh_list(&self) {
        let seq = self.list_seq.issue();
        let result = self.api.fetch_list().await;
        let mut page = self.page.write().await;
        if !self.list_seq.try_apply(seq) {
            tracing::debug!("丢弃过期的通知列表响应, 序号: {}", seq);
            return;
        }
        match result {
            Ok(notifications) => {
                tracing::debug!("获取通知列表成功, 共{}条", notifications.len());
                page.show_notifications(notifications);
            }
            Err(e) => {
                tracing::error!("获取通知列表失败: {}", e);
                page.show_load_error();
            }
        }
    }

    async fn acknowledge_one(&self, id: &NotificationId) {
        let result = self
            .api
            .mark_as_read(id, self.csrf_token.as_deref())
            .await;
        match result {
            Ok(AcknowledgementStatus::Success) => {}
            Ok(AcknowledgementStatus::Rejected { status, message }) => {
                tracing::debug!(
                    "[通知{}]标记已读未成功, status: {}, message: {:?}",
                    id,
                    status,
                    message
                );
                return;
            }
            Err(e) => {
                tracing::error!("[通知{}]标记已读失败: {}", id, e);
                if self.config.revert_checkbox_on_failure {
                    let mut page = self.page.write().await;
                    if let Some(item) = page.list.as_mut().and_then(|l| l.item_mut(id)) {
                        item.checked = false;
                    }
                }
                return;
            }
        }

        {
            let mut page = self.page.write().await;
            if let Some(item) = page.list.as_mut().and_then(|l| l.item_mut(id)) {
                item.fading = true;
            }
        }
        sleep(self.config.fade_delay()).await;
        {
            let mut page = self.page.write().await;
            let now_empty = match page.list.as_mut() {
                Some(list) => {
                    list.remove(id);
                    list.is_empty()
                }
                None => false,
            };
            if now_empty {
                page.show_empty();
            }
        }
        tracing::info!("[通知{}]已标记为已读", id);
        self.refresh_count().await;
    }

    async fn acknowledge_all(&self) {
        let result = self
            .api
            .mark_all_as_read(self.csrf_token.as_deref())
            .await;
        match result {
            Ok(AcknowledgementStatus::Success) => {}
            Ok(AcknowledgementStatus::Rejected { status, message }) => {
                tracing::debug!(
                    "全部标记已读未成功, status: {}, message: {:?}",
                    status,
                    message
                );
                return;
            }
            Err(e) => {
                tracing::error!("全部标记已读失败: {}", e);
                return;
            }
        }

        let faded = {
            let mut page = self.page.write().await;
            page.list.as_mut().map_or(0, |l| l.fade_all())
        };
        sleep(self.config.fade_delay()).await;
        self.page.write().await.show_empty();
        tracing::info!("全部通知已标记为已读, 共{}条", faded);
        self.refresh_count().await;
    }
}

// 页面上没有铃铛时组件不启动，交互入口也不做任何事
pub struct NotificationWidget {
    core: Arc<WidgetCore>,
    inert: bool,
    poller: Mutex<Option<JoinHandle<()>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NotificationWidget {
    pub fn new(api: Arc<dyn NotificationApi>, page: Page, config: WidgetConfig) -> Self {
        let csrf_token = get_csrf_token(&page.cookie);
        if csrf_token.is_none() {
            tracing::warn!("没有找到csrftoken, 标记已读的请求将不带CSRF头部");
        }
        let inert = !page.has_bell();
        let missing = page.missing_anchors();
        if !inert && !missing.is_empty() {
            tracing::warn!("页面缺少挂载点: {}", missing.join(", "));
        }
        Self {
            core: Arc::new(WidgetCore {
                api,
                page: Arc::new(RwLock::new(page)),
                csrf_token,
                config,
                count_seq: Sequencer::default(),
                list_seq: Sequencer::default(),
            }),
            inert,
            poller: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn page(&self) -> Arc<RwLock<Page>> {
        self.core.page.clone()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.core.csrf_token.as_deref()
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn is_running(&self) -> bool {
        lock(&self.poller).is_some()
    }

    // 立即拉取一次，之后每隔poll_interval拉取一次
    pub fn start(&self) -> bool {
        if self.inert {
            tracing::info!("页面上没有通知铃铛, 组件不启动");
            return false;
        }
        let mut poller = lock(&self.poller);
        if poller.is_some() {
            return true;
        }
        let core = self.core.clone();
        let period = self.core.config.poll_interval();
        *poller = Some(tokio::spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                core.refresh_count().await;
            }
        }));
        tracing::info!("通知组件已启动, 轮询间隔: {:?}", period);
        true
    }

    pub fn stop(&self) {
        let poller = lock(&self.poller).take();
        if let Some(handle) = poller {
            handle.abort();
            tracing::info!("通知组件已停止");
        }
        for handle in lock(&self.tasks).drain(..) {
            handle.abort();
        }
    }

    pub async fn refresh_count(&self) {
        self.core.refresh_count().await
    }

    pub async fn refresh_list(&self) {
        self.core.refresh_list().await
    }

    pub async fn acknowledge_one(&self, id: &NotificationId) {
        self.core.acknowledge_one(id).await
    }

    pub async fn acknowledge_all(&self) {
        self.core.acknowledge_all().await
    }

    pub fn click_bell(&self) {
        if !self.is_running() {
            return;
        }
        let core = self.core.clone();
        self.spawn_task(async move { core.refresh_list().await });
    }

    // 返回是否发出了标记已读的请求
    pub async fn set_checkbox(&self, id: &NotificationId, checked: bool) -> bool {
        if !self.is_running() {
            return false;
        }
        let was_checked = {
            let mut page = self.core.page.write().await;
            match page.list.as_mut().and_then(|l| l.item_mut(id)) {
                Some(item) => std::mem::replace(&mut item.checked, checked),
                None => {
                    tracing::debug!("[通知{}]不在列表中, 忽略", id);
                    return false;
                }
            }
        };
        // 只有从未勾选变为勾选时才发请求
        if !checked || was_checked {
            return false;
        }
        let core = self.core.clone();
        let id = id.clone();
        self.spawn_task(async move { core.acknowledge_one(&id).await });
        true
    }

    // 返回是否阻止了链接的默认跳转
    pub fn click_acknowledge_all(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        let core = self.core.clone();
        self.spawn_task(async move { core.acknowledge_all().await });
        true
    }

    fn spawn_task<F>(&self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut tasks = lock(&self.tasks);
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(tokio::spawn(future));
    }
}

impl Drop for NotificationWidget {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
