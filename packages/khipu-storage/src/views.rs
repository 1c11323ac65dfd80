use crate::{Error, Result, db::Db, models::ProjectView};

pub async fn view_by_id(db: &Db, view_id: i64) -> Result<ProjectView> {
	let view: Option<ProjectView> =
		sqlx::query_as("SELECT id, project_id, title FROM project_views WHERE id = $1")
			.bind(view_id)
			.fetch_optional(&db.pool)
			.await?;

	view.ok_or_else(|| Error::NotFound(format!("project view {view_id}")))
}
