const TABLES: &[&str] = &[
	include_str!("../../../sql/tables/001_projects.sql"),
	include_str!("../../../sql/tables/002_users.sql"),
	include_str!("../../../sql/tables/003_tasks.sql"),
	include_str!("../../../sql/tables/004_project_views.sql"),
	include_str!("../../../sql/tables/005_task_positions.sql"),
	include_str!("../../../sql/tables/006_task_relations.sql"),
	include_str!("../../../sql/tables/007_task_assignees.sql"),
	include_str!("../../../sql/tables/008_label_tasks.sql"),
	include_str!("../../../sql/tables/009_task_reminders.sql"),
	include_str!("../../../sql/tables/010_task_buckets.sql"),
	include_str!("../../../sql/tables/011_favorites.sql"),
];

pub fn render_schema() -> String {
	TABLES.concat()
}
