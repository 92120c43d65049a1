//! Recording fakes for the host collaborator traits.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::alert::{Alert, AlertPresenter};
use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse};
use crate::chrome::{StatusBar, StatusBarStyle};
use crate::navigation::WebSurface;
use crate::notifications::UrlOpener;
use crate::push::PushTokenService;

#[derive(Debug)]
pub struct RecordingApi {
    calls: Mutex<Vec<(String, ApiRequest)>>,
    response: Mutex<Result<ApiResponse, ApiError>>,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response: Mutex::new(Ok(ApiResponse::default())),
        }
    }
}

impl RecordingApi {
    pub fn respond_with(&self, response: Result<ApiResponse, ApiError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> Vec<(String, ApiRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiClient for RecordingApi {
    async fn call(&self, api_host: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((api_host.to_string(), request.clone()));
        self.response.lock().unwrap().clone()
    }
}

#[derive(Debug)]
pub struct RecordingPush {
    token: String,
    calls: AtomicUsize,
}

impl RecordingPush {
    pub fn returning(token: &str) -> Self {
        Self {
            token: token.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTokenService for RecordingPush {
    async fn fetch_token(&self, _experience_id: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.clone())
    }
}

#[derive(Debug, Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlerts {
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertPresenter for RecordingAlerts {
    fn present(&self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    loads: Mutex<Vec<String>>,
    backs: AtomicUsize,
}

impl RecordingSurface {
    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    pub fn back_count(&self) -> usize {
        self.backs.load(Ordering::SeqCst)
    }
}

impl WebSurface for RecordingSurface {
    fn load(&self, uri: &str) {
        self.loads.lock().unwrap().push(uri.to_string());
    }

    fn go_back(&self) {
        self.backs.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct RecordingStatusBar {
    applied: Mutex<Vec<StatusBarStyle>>,
    spacers: Mutex<Vec<String>>,
}

impl RecordingStatusBar {
    pub fn last(&self) -> Option<StatusBarStyle> {
        self.applied.lock().unwrap().last().copied()
    }

    pub fn applied(&self) -> Vec<StatusBarStyle> {
        self.applied.lock().unwrap().clone()
    }

    pub fn last_spacer(&self) -> Option<String> {
        self.spacers.lock().unwrap().last().cloned()
    }

    pub fn spacers(&self) -> Vec<String> {
        self.spacers.lock().unwrap().clone()
    }
}

impl StatusBar for RecordingStatusBar {
    fn set_style(&self, style: StatusBarStyle, _animated: bool) {
        self.applied.lock().unwrap().push(style);
    }

    fn set_spacer_color(&self, color: &str) {
        self.spacers.lock().unwrap().push(color.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open_url(&self, url: &str) -> anyhow::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
