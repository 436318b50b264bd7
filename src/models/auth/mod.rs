pub mod requests;
pub mod responses;

pub use requests::{GithubCallbackQuery, LoginRequest, RegisterRequest};
pub use responses::LoginResponse;
