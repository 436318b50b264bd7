use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::student_assignments::requests::{
    StudentAssignmentListParams, UpdateStatusRequest, WindowParams,
};
use crate::models::users::entities::UserRole;
use crate::services::{DueDateService, StudentAssignmentService};
use crate::utils::SafeIDI64;

// 懒加载的全局服务实例
static STUDENT_ASSIGNMENT_SERVICE: Lazy<StudentAssignmentService> =
    Lazy::new(StudentAssignmentService::new_lazy);
static DUE_DATE_SERVICE: Lazy<DueDateService> = Lazy::new(DueDateService::new_lazy);

pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<StudentAssignmentListParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE
        .list_assignments(&req, query.into_inner())
        .await
}

pub async fn overdue_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE.overdue(&req).await
}

pub async fn upcoming_assignments(
    req: HttpRequest,
    query: web::Query<WindowParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE
        .upcoming(&req, query.into_inner())
        .await
}

pub async fn recent_assignments(
    req: HttpRequest,
    query: web::Query<WindowParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE
        .recently_completed(&req, query.into_inner())
        .await
}

pub async fn get_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE.get_entry(&req, path.0).await
}

pub async fn update_status(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateStatusRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE
        .update_status(&req, path.0, body.into_inner())
        .await
}

pub async fn mark_completed(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE.mark_completed(&req, path.0).await
}

pub async fn mark_in_progress(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE
        .mark_in_progress(&req, path.0)
        .await
}

pub async fn dashboard_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE.dashboard_stats(&req).await
}

pub async fn categories(req: HttpRequest) -> ActixResult<HttpResponse> {
    STUDENT_ASSIGNMENT_SERVICE.categories(&req).await
}

// 截止提醒
pub async fn due_date_alerts(
    req: HttpRequest,
    query: web::Query<WindowParams>,
) -> ActixResult<HttpResponse> {
    DUE_DATE_SERVICE.alerts(&req, query.into_inner()).await
}

pub async fn due_date_summary(req: HttpRequest) -> ActixResult<HttpResponse> {
    DUE_DATE_SERVICE.summary(&req).await
}

pub async fn due_date_notifications(req: HttpRequest) -> ActixResult<HttpResponse> {
    DUE_DATE_SERVICE.notifications(&req).await
}

// 配置路由
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/student")
            .wrap(middlewares::RequireRole::new(&UserRole::Student))
            .wrap(middlewares::RequireJWT)
            .route("/assignments", web::get().to(list_assignments))
            // 固定路径必须先于 {id} 注册
            .route("/assignments/overdue", web::get().to(overdue_assignments))
            .route("/assignments/upcoming", web::get().to(upcoming_assignments))
            .route("/assignments/recent", web::get().to(recent_assignments))
            .route("/assignments/{id}", web::get().to(get_assignment))
            .route("/assignments/{id}/status", web::post().to(update_status))
            .route("/assignments/{id}/complete", web::post().to(mark_completed))
            .route("/assignments/{id}/progress", web::post().to(mark_in_progress))
            .route("/dashboard/stats", web::get().to(dashboard_stats))
            .route("/categories", web::get().to(categories))
            .route("/due-dates/alerts", web::get().to(due_date_alerts))
            .route("/due-dates/summary", web::get().to(due_date_summary))
            .route(
                "/due-dates/notifications",
                web::get().to(due_date_notifications),
            ),
    );
}
