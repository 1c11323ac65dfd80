use sqlx::{Executor, Postgres, Transaction};

use crate::{Result, db::Db, models::TaskPosition};

pub async fn position_exists(db: &Db, task_id: i64, project_view_id: i64) -> Result<bool> {
	let found: Option<i64> = sqlx::query_scalar(
		"SELECT 1 FROM task_positions WHERE task_id = $1 AND project_view_id = $2",
	)
	.bind(task_id)
	.bind(project_view_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(found.is_some())
}

pub async fn insert_position(db: &Db, position: &TaskPosition) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO task_positions (task_id, project_view_id, position)
VALUES ($1, $2, $3)",
	)
	.bind(position.task_id)
	.bind(position.project_view_id)
	.bind(position.position)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn update_position(db: &Db, position: &TaskPosition) -> Result<()> {
	sqlx::query(
		"\
UPDATE task_positions
SET position = $1
WHERE task_id = $2 AND project_view_id = $3",
	)
	.bind(position.position)
	.bind(position.task_id)
	.bind(position.project_view_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn positions_for_view(db: &Db, project_view_id: i64) -> Result<Vec<TaskPosition>> {
	let positions = sqlx::query_as(
		"\
SELECT task_id, project_view_id, position
FROM task_positions
WHERE project_view_id = $1",
	)
	.bind(project_view_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(positions)
}

pub async fn delete_positions_for_view_tx(
	tx: &mut Transaction<'_, Postgres>,
	project_view_id: i64,
) -> Result<()> {
	delete_positions_for_view_exec(&mut **tx, project_view_id).await
}

pub async fn insert_positions_tx(
	tx: &mut Transaction<'_, Postgres>,
	positions: &[TaskPosition],
) -> Result<()> {
	if positions.is_empty() {
		return Ok(());
	}

	let mut builder = sqlx::QueryBuilder::new(
		"INSERT INTO task_positions (task_id, project_view_id, position) ",
	);

	builder.push_values(positions, |mut row, position| {
		row.push_bind(position.task_id)
			.push_bind(position.project_view_id)
			.push_bind(position.position);
	});

	builder.build().execute(&mut **tx).await?;

	Ok(())
}

async fn delete_positions_for_view_exec<'e, E>(executor: E, project_view_id: i64) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query("DELETE FROM task_positions WHERE project_view_id = $1")
		.bind(project_view_id)
		.execute(executor)
		.await?;

	Ok(())
}
