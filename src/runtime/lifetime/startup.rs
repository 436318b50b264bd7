use crate::cache::{MokaCacheWrapper, ObjectCache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::users::{entities::UserRole, requests::NewLocalUser};
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例
fn create_cache() -> Arc<dyn ObjectCache> {
    let config = AppConfig::get();
    warn!(
        "Creating Moka cache backend (capacity: {}, ttl: {}s)",
        config.cache.memory.max_capacity, config.cache.default_ttl
    );
    Arc::new(MokaCacheWrapper::from_config())
}

/// 生成随机密码，保证包含大小写字母和数字
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    let body: String = (0..length.saturating_sub(3))
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    format!(
        "{}{}{}{}",
        body,
        rng.random_range(b'A'..=b'Z') as char,
        rng.random_range(b'a'..=b'z') as char,
        rng.random_range(b'0'..=b'9') as char,
    )
}

/// 初始化默认教师账号
/// 如果数据库中没有任何用户，则创建一个默认的 instructor 账号
async fn seed_instructor(storage: &Arc<dyn Storage>) {
    // 检查是否已有用户
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping instructor seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default instructor account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping instructor seed", e);
            return;
        }
    }

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("INSTRUCTOR_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  INSTRUCTOR PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated instructor password: {}", pwd);
        warn!("  Please save this password or set INSTRUCTOR_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!(
                "Failed to hash instructor password: {}, skipping instructor seed",
                e
            );
            return;
        }
    };

    let instructor = NewLocalUser {
        username: "instructor".to_string(),
        email: "instructor@localhost".to_string(),
        password_hash,
        role: UserRole::Instructor,
    };

    match storage.create_user(instructor, chrono::Utc::now()).await {
        Ok(user) => {
            info!(
                "Default instructor account created successfully (ID: {}, username: {})",
                user.id, user.username
            );
        }
        Err(e) => {
            warn!("Failed to create instructor account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储和缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_async().await?);
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认教师账号（如果需要）
    seed_instructor(&storage).await;

    let cache = create_cache();
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_passes_policy() {
        for _ in 0..20 {
            let password = generate_random_password(16);
            assert_eq!(password.len(), 16);
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_seed_runs_only_on_empty_store() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        seed_instructor(&storage).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);

        let seeded = storage
            .get_user_by_username("instructor")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seeded.role, UserRole::Instructor);

        seed_instructor(&storage).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }
}
