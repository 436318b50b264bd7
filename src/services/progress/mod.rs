pub mod assignment;
pub mod report;
pub mod summary;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use std::sync::Arc;

use super::respond;
use crate::config::AppConfig;
use crate::storage::Storage;

/// part / total × 100，total 为 0 时返回 0
pub(crate) fn percentage(part: i64, total: i64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

pub struct ProgressService {
    storage: Option<Arc<dyn Storage>>,
}

impl ProgressService {
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

    pub async fn assignment_progress(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = assignment::assignment_progress(storage.as_ref(), &ctx, assignment_id).await;
        respond(result, "获取作业进度成功")
    }

    pub async fn detailed_report(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result =
            report::detailed_report(storage.as_ref(), &ctx, assignment_id, Utc::now()).await;
        respond(result, "获取详细进度成功")
    }

    pub async fn instructor_summary(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);
        let limit = AppConfig::get().tracker.recent_completions_limit;

        let result = summary::instructor_summary(storage.as_ref(), &ctx, limit, Utc::now()).await;
        respond(result, "获取进度汇总成功")
    }
}
