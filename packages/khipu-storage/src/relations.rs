use crate::{Result, db::Db, models::RelationKind};

/// Tasks directly related to any of `task_ids` through `kind` edges. One
/// hop only; callers walk the closure themselves.
pub async fn related_task_ids(db: &Db, task_ids: &[i64], kind: RelationKind) -> Result<Vec<i64>> {
	if task_ids.is_empty() {
		return Ok(Vec::new());
	}

	let ids: Vec<i64> = sqlx::query_scalar(
		"\
SELECT other_task_id
FROM task_relations
WHERE relation_kind = $1 AND task_id = ANY($2)",
	)
	.bind(kind.as_str())
	.bind(task_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}
