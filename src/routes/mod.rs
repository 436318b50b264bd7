pub mod auth;

pub mod health;

pub mod instructor;

pub mod student;

pub use auth::configure_auth_routes;
pub use health::configure_health_routes;
pub use instructor::configure_instructor_routes;
pub use student::configure_student_routes;
