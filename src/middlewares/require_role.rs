/*!
 * 角色访问控制中间件
 *
 * 必须在 RequireJWT 之后执行（actix 中后 wrap 的先执行，所以要写在 RequireJWT 之前）。
 * 教师接口和学生接口严格分开，不存在两种角色共用的业务接口。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::{
    middlewares::RequireJWT,
    models::{ErrorCode, users::entities::UserRole},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    required_role: UserRole,
}

impl RequireRole {
    pub fn new(role: &UserRole) -> Self {
        Self {
            required_role: *role,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_role: self.required_role,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_role: UserRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required_role = self.required_role;

        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let (code, message) = match RequireJWT::extract_user_role(req.request()) {
                Some(role) if role == required_role => {
                    return Ok(srv.call(req).await?.map_into_left_body());
                }
                Some(role) => {
                    info!(
                        "Access denied for role {:?}, required {:?}",
                        role, required_role
                    );
                    match required_role {
                        UserRole::Instructor => {
                            (ErrorCode::NotAnInstructor, "Instructor role required")
                        }
                        UserRole::Student => (ErrorCode::NotAStudent, "Student role required"),
                    }
                }
                None => {
                    info!("Role check failed: RequireJWT must run before RequireRole");
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            Ok(req.into_response(
                create_error_response(StatusCode::FORBIDDEN, code, message).map_into_right_body(),
            ))
        })
    }
}
