use chrono::{DateTime, Utc};

use crate::errors::{Result, TrackerError};
use crate::models::assignments::{
    entities::{Assignment, AssignmentFields},
    requests::AssignmentRequest,
};
use crate::services::access::{AuthContext, require_instructor};
use crate::storage::Storage;
use crate::utils::{parse_due_date, validate};

/// 校验请求并转换为存储字段，创建和更新共用
pub(crate) fn validated_fields(req: AssignmentRequest) -> Result<AssignmentFields> {
    validate::validate_title(&req.title).map_err(TrackerError::validation)?;
    validate::validate_url(&req.url).map_err(TrackerError::validation)?;
    let due_date = parse_due_date(req.due_date.as_deref())?;

    Ok(AssignmentFields {
        title: req.title.trim().to_string(),
        description: req.description,
        url: req.url.trim().to_string(),
        category: req.category.trim().to_string(),
        due_date,
    })
}

pub async fn create_assignment(
    storage: &dyn Storage,
    ctx: &AuthContext,
    req: AssignmentRequest,
    now: DateTime<Utc>,
) -> Result<Assignment> {
    let instructor = require_instructor(storage, ctx).await?;
    let fields = validated_fields(req)?;

    let assignment = storage.create_assignment(instructor.id, fields, now).await?;
    tracing::info!(
        "Instructor {} created assignment {}",
        instructor.id,
        assignment.id
    );
    Ok(assignment)
}
