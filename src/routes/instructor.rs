use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::{
    AssignStudentsRequest, AssignmentListParams, AssignmentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::{AssignmentService, DueDateService, ProgressService};
use crate::utils::{SafeIDI64, SafeStudentIdI64};

// 懒加载的全局服务实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);
static PROGRESS_SERVICE: Lazy<ProgressService> = Lazy::new(ProgressService::new_lazy);
static DUE_DATE_SERVICE: Lazy<DueDateService> = Lazy::new(DueDateService::new_lazy);

// 作业目录
pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_assignments(&req, query.into_inner())
        .await
}

pub async fn create_assignment(
    req: HttpRequest,
    body: web::Json<AssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(&req, body.into_inner())
        .await
}

pub async fn get_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_assignment(&req, path.0).await
}

pub async fn update_assignment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<AssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(&req, path.0, body.into_inner())
        .await
}

pub async fn delete_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.delete_assignment(&req, path.0).await
}

pub async fn assign_students(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<AssignStudentsRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .assign_students(&req, path.0, body.into_inner())
        .await
}

pub async fn assignment_students(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.assignment_students(&req, path.0).await
}

pub async fn remove_student(
    req: HttpRequest,
    path: SafeIDI64,
    student: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .remove_student(&req, path.0, student.0)
        .await
}

pub async fn list_students(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_students(&req).await
}

pub async fn dashboard_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.dashboard_stats(&req).await
}

// 进度统计
pub async fn assignment_progress(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE.assignment_progress(&req, path.0).await
}

pub async fn detailed_progress(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE.detailed_report(&req, path.0).await
}

pub async fn progress_summary(req: HttpRequest) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE.instructor_summary(&req).await
}

// 截止日期
pub async fn due_date_overview(req: HttpRequest) -> ActixResult<HttpResponse> {
    DUE_DATE_SERVICE.instructor_overview(&req).await
}

// 配置路由
pub fn configure_instructor_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/instructor")
            .wrap(middlewares::RequireRole::new(&UserRole::Instructor))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/assignments")
                    .route(web::get().to(list_assignments))
                    .route(web::post().to(create_assignment)),
            )
            .service(
                web::resource("/assignments/{id}")
                    .route(web::get().to(get_assignment))
                    .route(web::put().to(update_assignment))
                    .route(web::delete().to(delete_assignment)),
            )
            .route("/assignments/{id}/assign", web::post().to(assign_students))
            .route(
                "/assignments/{id}/progress",
                web::get().to(assignment_progress),
            )
            .route(
                "/assignments/{id}/detailed-progress",
                web::get().to(detailed_progress),
            )
            .route(
                "/assignments/{id}/students",
                web::get().to(assignment_students),
            )
            .route(
                "/assignments/{id}/students/{student_id}",
                web::delete().to(remove_student),
            )
            .route("/students", web::get().to(list_students))
            .route("/dashboard/stats", web::get().to(dashboard_stats))
            .route("/progress/summary", web::get().to(progress_summary))
            .route("/due-dates/overview", web::get().to(due_date_overview)),
    );
}
