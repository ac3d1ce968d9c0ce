use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify_bell::config::{BackendConfig, WidgetConfig};
use notify_bell::model::notification::AcknowledgementStatus;
use notify_bell::model::page::EMPTY_PLACEHOLDER;
use notify_bell::{
    HttpNotificationClient, NotificationApi, NotificationId, NotificationWidget, Page,
};

const COOKIE: &str = "sessionid=abc; csrftoken=tok%2B1";
const CSRF: &str = "tok+1";

#[derive(Default)]
struct Backend {
    unread: Mutex<Vec<(i64, String)>>,
    cookies: Mutex<Vec<String>>,
    content_types: Mutex<Vec<String>>,
}

impl Backend {
    fn with_unread(ids: &[i64]) -> web::Data<Self> {
        let backend = Self::default();
        *backend.unread.lock().unwrap() = ids
            .iter()
            .map(|id| (*id, format!("Notification {}", id)))
            .collect();
        web::Data::new(backend)
    }

    fn record(&self, req: &HttpRequest) {
        if let Some(v) = req.headers().get("Cookie").and_then(|v| v.to_str().ok()) {
            self.cookies.lock().unwrap().push(v.to_string());
        }
        if let Some(v) = req
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
        {
            self.content_types.lock().unwrap().push(v.to_string());
        }
    }
}

// 与Django的CSRF中间件一样，校验失败时返回HTML
fn csrf_ok(req: &HttpRequest) -> bool {
    req.headers()
        .get("X-CSRFToken")
        .and_then(|v| v.to_str().ok())
        == Some(CSRF)
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden()
        .content_type("text/html")
        .body("<h1>Forbidden (403)</h1><p>CSRF verification failed.</p>")
}

async fn count(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req);
    let count = backend.unread.lock().unwrap().len();
    HttpResponse::Ok().json(json!({ "count": count }))
}

async fn list(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req);
    let notifications: Vec<_> = backend
        .unread
        .lock()
        .unwrap()
        .iter()
        .map(|(id, message)| {
            json!({ "id": id, "message": message, "created_at": "Jan 02, 2025, 03:04 PM" })
        })
        .collect();
    HttpResponse::Ok().json(json!({ "notifications": notifications }))
}

async fn mark_as_read(
    req: HttpRequest,
    path: web::Path<i64>,
    backend: web::Data<Backend>,
) -> HttpResponse {
    backend.record(&req);
    if !csrf_ok(&req) {
        return forbidden();
    }
    let id = path.into_inner();
    let mut unread = backend.unread.lock().unwrap();
    match unread.iter().position(|(v, _)| *v == id) {
        Some(index) => {
            unread.remove(index);
            HttpResponse::Ok().json(json!({ "status": "success" }))
        }
        None => HttpResponse::NotFound()
            .json(json!({ "status": "error", "message": "Notification not found" })),
    }
}

async fn mark_all_as_read(req: HttpRequest, backend: web::Data<Backend>) -> HttpResponse {
    backend.record(&req);
    if !csrf_ok(&req) {
        return forbidden();
    }
    backend.unread.lock().unwrap().clear();
    HttpResponse::Ok().json(json!({ "status": "success" }))
}

fn spawn_backend(backend: web::Data<Backend>) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(backend.clone())
            .route("/notifications/count/", web::get().to(count))
            .route("/notifications/list/", web::get().to(list))
            .route(
                "/notifications/mark-as-read/{id}/",
                web::post().to(mark_as_read),
            )
            .route(
                "/notifications/mark-all-as-read/",
                web::post().to(mark_all_as_read),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

fn client(base_url: &str, cookie: &str) -> HttpNotificationClient {
    HttpNotificationClient::new(
        BackendConfig {
            base_url: base_url.to_string(),
            no_proxy: true,
            ..BackendConfig::default()
        },
        cookie,
    )
    .unwrap()
}

#[actix_web::test]
async fn fetches_count_and_list_with_cookie() {
    let backend = Backend::with_unread(&[1, 2]);
    let base_url = spawn_backend(backend.clone());
    let client = client(&base_url, COOKIE);

    let summary = client.fetch_count().await.unwrap();
    assert_eq!(summary.count, 2);

    let notifications = client.fetch_list().await.unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].id, NotificationId::Int(1));
    assert_eq!(notifications[1].message, "Notification 2");
    assert_eq!(notifications[1].created_at, "Jan 02, 2025, 03:04 PM");

    assert!(backend.cookies.lock().unwrap().iter().all(|c| c == COOKIE));
}

#[actix_web::test]
async fn mark_as_read_sends_csrf_and_content_type() {
    let backend = Backend::with_unread(&[1, 2]);
    let base_url = spawn_backend(backend.clone());
    let client = client(&base_url, COOKIE);

    let status = client
        .mark_as_read(&NotificationId::Int(2), Some(CSRF))
        .await
        .unwrap();
    assert_eq!(status, AcknowledgementStatus::Success);
    assert_eq!(backend.unread.lock().unwrap().len(), 1);
    assert!(backend
        .content_types
        .lock()
        .unwrap()
        .iter()
        .all(|v| v == "application/json"));
}

#[actix_web::test]
async fn unknown_notification_is_rejected_not_failed() {
    let backend = Backend::with_unread(&[1]);
    let base_url = spawn_backend(backend.clone());
    let client = client(&base_url, COOKIE);

    let status = client
        .mark_as_read(&NotificationId::Int(99), Some(CSRF))
        .await
        .unwrap();
    assert_eq!(
        status,
        AcknowledgementStatus::Rejected {
            status: "error".to_string(),
            message: Some("Notification not found".to_string()),
        }
    );
}

#[actix_web::test]
async fn missing_csrf_token_fails_to_decode() {
    let backend = Backend::with_unread(&[1]);
    let base_url = spawn_backend(backend.clone());
    let client = client(&base_url, "sessionid=abc");

    let err = client.mark_all_as_read(None).await.unwrap_err();
    assert!(err.is_decode_err());
    assert_eq!(backend.unread.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn unreachable_backend_is_a_request_error() {
    let client = HttpNotificationClient::new(
        BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            no_proxy: true,
            connect_timeout: 1,
            whole_timeout: 2,
            ..BackendConfig::default()
        },
        "",
    )
    .unwrap();

    let err = client.fetch_count().await.unwrap_err();
    assert!(err.is_request_err());
}

#[actix_web::test]
async fn widget_acknowledges_against_real_backend() {
    let backend = Backend::with_unread(&[1, 2, 3]);
    let base_url = spawn_backend(backend.clone());
    let widget = NotificationWidget::new(
        Arc::new(client(&base_url, COOKIE)),
        Page::full(COOKIE),
        WidgetConfig {
            fade_delay_ms: 10,
            ..WidgetConfig::default()
        },
    );
    assert_eq!(widget.csrf_token(), Some(CSRF));
    assert!(widget.start());

    widget.refresh_list().await;
    widget.acknowledge_one(&NotificationId::Int(2)).await;
    {
        let page = widget.page();
        let page = page.read().await;
        assert_eq!(page.count_text(), Some("2"));
        assert_eq!(page.list.as_ref().unwrap().unread_len(), 2);
    }

    widget.acknowledge_all().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let page = widget.page();
    let page = page.read().await;
    assert!(!page.badge_visible());
    assert_eq!(
        page.list.as_ref().unwrap().placeholder(),
        Some(EMPTY_PLACEHOLDER)
    );
    assert!(backend.unread.lock().unwrap().is_empty());
    widget.stop();
}
