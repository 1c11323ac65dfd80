//! Fractional ordering of tasks inside a project view. Positions are plain
//! floats so a task can always be dropped between two neighbours by
//! bisection; when a caller runs out of numeric room the whole view is
//! renumbered across a fixed span.

use std::sync::Arc;

use khipu_domain::{Actor, SortOrder, SortParam, TaskSearchOptions};
use khipu_storage::{
	db::Db,
	models::{ProjectView, Task, TaskPosition},
	positions, views,
};

use crate::{
	DbTaskSearcher, Event, EventSink, ProjectResolver, Result, TaskPositionsRecalculatedEvent,
	TaskSearcher,
};

/// The numeric range renumbering spreads a view's tasks across.
pub const POSITION_SPAN: f64 = (1u64 << 32) as f64;
/// Positions below this trigger a renumbering of the whole view. Derived
/// from the span so the trigger scales with it: at this gap size a view
/// would need 2^35 tasks before renumbering stops helping.
pub const REBALANCE_THRESHOLD: f64 = POSITION_SPAN / (1u64 << 35) as f64;

pub struct PositionManager {
	db: Db,
	events: Arc<dyn EventSink>,
	projects: Arc<dyn ProjectResolver>,
}
impl PositionManager {
	pub fn new(db: Db, events: Arc<dyn EventSink>, projects: Arc<dyn ProjectResolver>) -> Self {
		Self { db, events, projects }
	}

	/// Writes one task's position in one view, inserting the row if it does
	/// not exist yet. A requested position below [`REBALANCE_THRESHOLD`]
	/// means the caller ran out of room between neighbours, so the whole
	/// view is renumbered after the write. A write that did not trigger
	/// renumbering emits a task-updated event instead.
	pub async fn set_position(&self, actor: Actor, position: &TaskPosition) -> Result<()> {
		// Resolve the view up front so a dangling view id fails before any
		// write happens.
		let view = if position.position < REBALANCE_THRESHOLD {
			Some(views::view_by_id(&self.db, position.project_view_id).await?)
		} else {
			None
		};

		if positions::position_exists(&self.db, position.task_id, position.project_view_id).await? {
			positions::update_position(&self.db, position).await?;
		} else {
			positions::insert_position(&self.db, position).await?;
		}

		if let Some(view) = view {
			return self.recalculate(&view, actor).await;
		}

		self.events.publish(Event::TaskUpdated { task_id: position.task_id });

		Ok(())
	}

	/// Renumbers every task visible under `view`, evenly spaced across
	/// [`POSITION_SPAN`] in their current position order. All existing rows
	/// for the view are replaced in one transaction; an empty view is a
	/// no-op and emits nothing.
	pub async fn recalculate(&self, view: &ProjectView, actor: Actor) -> Result<()> {
		// A saved-filter view hangs below a virtual project; resolving
		// project 0 yields everything the filter covers.
		let project_id = if view.project_id < -1 { 0 } else { view.project_id };
		let project_ids = self.projects.resolve(&self.db, actor, project_id).await?;
		let opts = TaskSearchOptions {
			actor,
			project_ids,
			sort_by: vec![SortParam::position(view.id, SortOrder::Ascending)],
			..TaskSearchOptions::default()
		};
		let (tasks, _) = DbTaskSearcher::new(self.db.clone()).search(&opts).await?;

		if tasks.is_empty() {
			return Ok(());
		}

		tracing::debug!(view_id = view.id, tasks = tasks.len(), "Renumbering view positions.");

		let new_positions = spaced_positions(&tasks, view.id);
		let mut tx = self.db.pool.begin().await?;

		positions::delete_positions_for_view_tx(&mut tx, view.id).await?;
		positions::insert_positions_tx(&mut tx, &new_positions).await?;
		tx.commit().await?;

		self.events.publish(Event::TaskPositionsRecalculated(TaskPositionsRecalculatedEvent {
			new_positions,
		}));

		Ok(())
	}
}

/// Slot `i` (1-based) of `count` gets `span / count * i`, so every task ends
/// up strictly increasing with identical gaps and the last one lands exactly
/// on the span.
fn spaced_positions(tasks: &[Task], project_view_id: i64) -> Vec<TaskPosition> {
	let count = tasks.len() as f64;

	tasks
		.iter()
		.enumerate()
		.map(|(i, task)| TaskPosition {
			task_id: task.id,
			project_view_id,
			position: POSITION_SPAN / count * (i as f64 + 1.),
		})
		.collect()
}
