use super::entities::UserRole;

// 创建本地账号（存储层使用，密码已经哈希）
#[derive(Debug, Clone)]
pub struct NewLocalUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

// GitHub 用户资料，用于首次登录创建账号或后续同步
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub github_id: i64,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
}
