pub mod entry;
pub mod list;
pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use std::sync::Arc;

use super::respond;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::student_assignments::{
    entities::StudentAssignmentDetail,
    requests::{StudentAssignmentListParams, UpdateStatusRequest, WindowParams},
    responses::{CategoriesResponse, StudentAssignmentListResponse},
};
use crate::storage::Storage;

fn into_list(result: Result<Vec<StudentAssignmentDetail>>) -> Result<StudentAssignmentListResponse> {
    result.map(|items| StudentAssignmentListResponse {
        total: items.len() as i64,
        items,
    })
}

pub struct StudentAssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentAssignmentService {
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

    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        query: StudentAssignmentListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = list::list_assignments(storage.as_ref(), &ctx, &query).await;
        respond(into_list(result), "获取作业列表成功")
    }

    pub async fn overdue(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = list::overdue(storage.as_ref(), &ctx, Utc::now()).await;
        respond(into_list(result), "获取过期作业成功")
    }

    pub async fn upcoming(
        &self,
        request: &HttpRequest,
        query: WindowParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);
        let default_days = AppConfig::get().tracker.default_window_days;

        let result =
            list::upcoming(storage.as_ref(), &ctx, query.days, default_days, Utc::now()).await;
        respond(into_list(result), "获取即将到期作业成功")
    }

    pub async fn recently_completed(
        &self,
        request: &HttpRequest,
        query: WindowParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);
        let default_days = AppConfig::get().tracker.default_window_days;

        let result = list::recently_completed(
            storage.as_ref(),
            &ctx,
            query.days,
            default_days,
            Utc::now(),
        )
        .await;
        respond(into_list(result), "获取最近完成作业成功")
    }

    pub async fn get_entry(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = entry::get_entry(storage.as_ref(), &ctx, assignment_id).await;
        respond(result, "获取作业成功")
    }

    pub async fn update_status(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        req: UpdateStatusRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result =
            entry::update_status(storage.as_ref(), &ctx, assignment_id, &req.status, Utc::now())
                .await;
        respond(result, "作业状态已更新")
    }

    pub async fn mark_completed(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = entry::mark_completed(storage.as_ref(), &ctx, assignment_id, Utc::now()).await;
        respond(result, "作业已完成")
    }

    pub async fn mark_in_progress(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result =
            entry::mark_in_progress(storage.as_ref(), &ctx, assignment_id, Utc::now()).await;
        respond(result, "作业已开始")
    }

    pub async fn dashboard_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = stats::dashboard_stats(storage.as_ref(), &ctx, Utc::now()).await;
        respond(result, "获取统计信息成功")
    }

    pub async fn categories(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = stats::categories(storage.as_ref(), &ctx)
            .await
            .map(|categories| CategoriesResponse { categories });
        respond(result, "获取分类成功")
    }
}
