use khipu_config::Postgres;
use khipu_storage::{
	db::Db,
	models::TaskPosition,
	positions,
};
use khipu_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres. Set KHIPU_PG_DSN to run."]
async fn schema_bootstrap_creates_the_task_tables() {
	let Some(base_dsn) = khipu_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_creates_the_task_tables; set KHIPU_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	// A second run must be a no-op, not a failure.
	db.ensure_schema().await.expect("Failed to re-run schema bootstrap.");

	for table in
		["projects", "tasks", "project_views", "task_positions", "task_relations", "favorites"]
	{
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Expected table {table} to exist.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set KHIPU_PG_DSN to run."]
async fn position_rows_are_keyed_by_task_and_view() {
	let Some(base_dsn) = khipu_testkit::env_dsn() else {
		eprintln!("Skipping position_rows_are_keyed_by_task_and_view; set KHIPU_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let position = TaskPosition { task_id: 1, project_view_id: 10, position: 100. };

	assert!(!positions::position_exists(&db, 1, 10).await.expect("Failed to check position."));

	positions::insert_position(&db, &position).await.expect("Failed to insert position.");

	assert!(positions::position_exists(&db, 1, 10).await.expect("Failed to check position."));
	// The same task in another view is an independent row.
	assert!(!positions::position_exists(&db, 1, 11).await.expect("Failed to check position."));

	let moved = TaskPosition { position: 250., ..position };

	positions::update_position(&db, &moved).await.expect("Failed to update position.");

	let rows = positions::positions_for_view(&db, 10).await.expect("Failed to list positions.");

	assert_eq!(rows, vec![moved]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set KHIPU_PG_DSN to run."]
async fn bulk_replace_is_transactional() {
	let Some(base_dsn) = khipu_testkit::env_dsn() else {
		eprintln!("Skipping bulk_replace_is_transactional; set KHIPU_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let stale = TaskPosition { task_id: 1, project_view_id: 10, position: 1. };

	positions::insert_position(&db, &stale).await.expect("Failed to insert position.");

	let replacement = vec![
		TaskPosition { task_id: 2, project_view_id: 10, position: 100. },
		TaskPosition { task_id: 3, project_view_id: 10, position: 200. },
	];
	let mut tx = db.pool.begin().await.expect("Failed to begin transaction.");

	positions::delete_positions_for_view_tx(&mut tx, 10)
		.await
		.expect("Failed to delete positions.");
	positions::insert_positions_tx(&mut tx, &replacement)
		.await
		.expect("Failed to insert positions.");

	// Uncommitted: the old row is still what other connections see.
	let rows = positions::positions_for_view(&db, 10).await.expect("Failed to list positions.");

	assert_eq!(rows, vec![stale]);

	tx.commit().await.expect("Failed to commit transaction.");

	let mut rows =
		positions::positions_for_view(&db, 10).await.expect("Failed to list positions.");

	rows.sort_by_key(|row| row.task_id);

	assert_eq!(rows, replacement);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
