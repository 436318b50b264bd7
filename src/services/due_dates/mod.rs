pub mod alerts;
pub mod classify;
pub mod overview;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use std::sync::Arc;

use super::respond;
use crate::config::AppConfig;
use crate::models::due_dates::responses::DueDateAlertsResponse;
use crate::models::student_assignments::requests::WindowParams;
use crate::storage::Storage;

pub struct DueDateService {
    storage: Option<Arc<dyn Storage>>,
}

impl DueDateService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn alerts(
        &self,
        request: &HttpRequest,
        query: WindowParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);
        let window = AppConfig::get().tracker.alert_window_days;

        let result = alerts::upcoming_alerts(storage.as_ref(), &ctx, query.days, window, Utc::now())
            .await
            .map(|alerts| DueDateAlertsResponse {
                total: alerts.len() as i64,
                alerts,
            });
        respond(result, "获取截止提醒成功")
    }

    pub async fn summary(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);
        let window = AppConfig::get().tracker.alert_window_days;

        let result = alerts::summary(storage.as_ref(), &ctx, window, Utc::now()).await;
        respond(result, "获取截止汇总成功")
    }

    pub async fn notifications(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);
        let window = AppConfig::get().tracker.alert_window_days;

        let result = alerts::notifications(storage.as_ref(), &ctx, window, Utc::now()).await;
        respond(result, "获取截止通知成功")
    }

    pub async fn instructor_overview(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);
        let window = AppConfig::get().tracker.alert_window_days;

        let result = overview::instructor_overview(storage.as_ref(), &ctx, window, Utc::now()).await;
        respond(result, "获取截止概览成功")
    }
}
