//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 所有时间字段均为 UNIX 秒，deleted_at 非空表示已软删除。

pub mod prelude;

pub mod assignments;
pub mod student_assignments;
pub mod users;

use chrono::{DateTime, Utc};

/// UNIX 秒转换为 UTC 时间
pub(crate) fn ts_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
