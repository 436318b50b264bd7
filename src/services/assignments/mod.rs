pub mod assign;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod remove;
pub mod stats;
pub mod students;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use chrono::Utc;
use std::sync::Arc;

use super::{respond, respond_empty, respond_with};
use crate::models::assignments::{
    requests::{AssignStudentsRequest, AssignmentListParams, AssignmentRequest},
    responses::AssignmentListResponse,
};
use crate::models::users::responses::StudentListResponse;
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
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
        query: AssignmentListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = list::list_assignments(storage.as_ref(), &ctx, &query)
            .await
            .map(|items| AssignmentListResponse {
                total: items.len() as i64,
                items,
            });
        respond(result, "获取作业列表成功")
    }

    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        req: AssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = create::create_assignment(storage.as_ref(), &ctx, req, Utc::now()).await;
        respond_with(StatusCode::CREATED, result, "作业创建成功")
    }

    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = get::get_assignment(storage.as_ref(), &ctx, assignment_id).await;
        respond(result, "获取作业成功")
    }

    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        req: AssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result =
            update::update_assignment(storage.as_ref(), &ctx, assignment_id, req, Utc::now())
                .await;
        respond(result, "作业更新成功")
    }

    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result =
            delete::delete_assignment(storage.as_ref(), &ctx, assignment_id, Utc::now()).await;
        respond_empty(result, "作业已删除")
    }

    pub async fn assign_students(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        req: AssignStudentsRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = assign::assign_students(
            storage.as_ref(),
            &ctx,
            assignment_id,
            &req.student_ids,
            Utc::now(),
        )
        .await;
        respond_with(StatusCode::CREATED, result, "学生分配成功")
    }

    pub async fn remove_student(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result =
            remove::remove_student(storage.as_ref(), &ctx, assignment_id, student_id, Utc::now())
                .await;
        respond_empty(result, "学生已移出作业")
    }

    pub async fn assignment_students(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = students::assignment_students(storage.as_ref(), &ctx, assignment_id).await;
        respond(result, "获取作业学生成功")
    }

    pub async fn list_students(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = students::list_students(storage.as_ref(), &ctx)
            .await
            .map(|items| StudentListResponse {
                total: items.len() as i64,
                items,
            });
        respond(result, "获取学生列表成功")
    }

    pub async fn dashboard_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let ctx = auth_context!(request);

        let result = stats::dashboard_stats(storage.as_ref(), &ctx, Utc::now()).await;
        respond(result, "获取统计信息成功")
    }
}
