//! Administration of the entities notes refer to: categories, groups, members, and users.
//!
//! These operations are not access-checked here. The API only exposes them on the admin listener.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, MAX_LABEL_CHARS, QuillService, Result};
use quill_domain::validate;
use quill_storage::{
	categories, membership,
	models::{self, Category, GroupMember, NoteGroup},
	queries,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
	pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
	pub name: String,
	/// Users to add right away. Unknown users are registered.
	#[serde(default)]
	pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryView {
	pub category_id: Uuid,
	pub title: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl From<Category> for CategoryView {
	fn from(category: Category) -> Self {
		Self {
			category_id: category.category_id,
			title: category.title,
			created_at: category.created_at,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
	pub group_id: Uuid,
	pub name: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl From<NoteGroup> for GroupView {
	fn from(group: NoteGroup) -> Self {
		Self { group_id: group.group_id, name: group.name, created_at: group.created_at }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberView {
	pub group_id: Uuid,
	pub user_id: String,
	#[serde(with = "time::serde::rfc3339")]
	pub joined_at: OffsetDateTime,
}
impl From<GroupMember> for MemberView {
	fn from(member: GroupMember) -> Self {
		Self { group_id: member.group_id, user_id: member.user_id, joined_at: member.joined_at }
	}
}

impl QuillService {
	pub async fn list_categories(&self) -> Result<Vec<CategoryView>> {
		let pool = &self.db.pool;
		let rows = self.db.retrying(move || categories::list_categories(pool)).await?;

		Ok(rows.into_iter().map(CategoryView::from).collect())
	}

	pub async fn create_category(&self, req: CreateCategoryRequest) -> Result<CategoryView> {
		let title = validate::label("$.title", &req.title, MAX_LABEL_CHARS)?;
		let created_at = models::stored_instant(OffsetDateTime::now_utc());
		let category = Category { category_id: Uuid::new_v4(), title, created_at };
		let (pool, row) = (&self.db.pool, &category);

		self.db.retrying(move || categories::insert_category(pool, row)).await?;

		tracing::info!(category_id = %category.category_id, "Category created.");

		Ok(category.into())
	}

	/// Deletes a category. Notes keep existing without one.
	pub async fn delete_category(&self, category_id: Uuid) -> Result<()> {
		let pool = &self.db.pool;
		let deleted =
			self.db.retrying(move || categories::delete_category(pool, category_id)).await?;

		if !deleted {
			return Err(Error::NotFound { message: format!("Category {category_id} not found.") });
		}

		tracing::info!(%category_id, "Category deleted.");

		Ok(())
	}

	/// Groups `user_id` currently belongs to, which are the groups it may share notes with.
	pub async fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<GroupView>> {
		let pool = &self.db.pool;
		let rows =
			self.db.retrying(move || membership::list_groups_for_user(pool, user_id)).await?;

		Ok(rows.into_iter().map(GroupView::from).collect())
	}

	pub async fn create_group(&self, req: CreateGroupRequest) -> Result<GroupView> {
		let name = validate::label("$.name", &req.name, MAX_LABEL_CHARS)?;
		let members = req
			.members
			.iter()
			.map(|user_id| validate::user_id("$.members", user_id))
			.collect::<Result<Vec<_>, _>>()?;
		let created_at = models::stored_instant(OffsetDateTime::now_utc());
		let group = NoteGroup { group_id: Uuid::new_v4(), name, created_at };
		let (row, members_ref) = (&group, members.as_slice());

		self.db.retrying(move || self.create_group_once(row, members_ref)).await?;

		tracing::info!(group_id = %group.group_id, members = members.len(), "Group created.");

		Ok(group.into())
	}

	async fn create_group_once(&self, group: &NoteGroup, members: &[String]) -> Result<()> {
		let mut tx = self.db.pool.begin().await?;

		membership::insert_group(&mut *tx, group).await?;

		for user_id in members {
			queries::ensure_user(&mut *tx, user_id).await?;
			membership::add_member(&mut *tx, group.group_id, user_id, group.created_at).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	/// Deletes a group. Notes shared with it become private to their owners.
	pub async fn delete_group(&self, group_id: Uuid) -> Result<()> {
		let pool = &self.db.pool;
		let deleted = self.db.retrying(move || membership::delete_group(pool, group_id)).await?;

		if !deleted {
			return Err(Error::NotFound { message: format!("Group {group_id} not found.") });
		}

		tracing::info!(%group_id, "Group deleted.");

		Ok(())
	}

	pub async fn list_members(&self, group_id: Uuid) -> Result<Vec<MemberView>> {
		let pool = &self.db.pool;
		let rows = self
			.db
			.retrying(move || async move {
				if !membership::group_exists(pool, group_id).await? {
					return Err(quill_storage::Error::NotFound(format!(
						"Group {group_id} not found."
					)));
				}

				membership::list_members(pool, group_id).await
			})
			.await?;

		Ok(rows.into_iter().map(MemberView::from).collect())
	}

	/// Adds `user_id` to a group, registering the user if needed. Adding an existing member is a
	/// no-op. Takes effect on the member's very next read.
	pub async fn add_member(&self, group_id: Uuid, user_id: &str) -> Result<MemberView> {
		let user_id = validate::user_id("$.user_id", user_id)?;
		let now = models::stored_instant(OffsetDateTime::now_utc());
		let user = user_id.as_str();

		self.db.retrying(move || self.add_member_once(group_id, user, now)).await?;

		tracing::info!(%group_id, user_id = user, "Group member added.");

		Ok(MemberView { group_id, user_id, joined_at: now })
	}

	async fn add_member_once(
		&self,
		group_id: Uuid,
		user_id: &str,
		now: OffsetDateTime,
	) -> Result<()> {
		let mut tx = self.db.pool.begin().await?;

		if !membership::group_exists(&mut *tx, group_id).await? {
			return Err(Error::NotFound { message: format!("Group {group_id} not found.") });
		}

		queries::ensure_user(&mut *tx, user_id).await?;
		membership::add_member(&mut *tx, group_id, user_id, now).await?;

		tx.commit().await?;

		Ok(())
	}

	/// Removes `user_id` from a group. The user loses access to the group's notes immediately.
	pub async fn remove_member(&self, group_id: Uuid, user_id: &str) -> Result<()> {
		let pool = &self.db.pool;
		let removed =
			self.db.retrying(move || membership::remove_member(pool, group_id, user_id)).await?;

		if !removed {
			return Err(Error::NotFound {
				message: format!("User {user_id} is not a member of group {group_id}."),
			});
		}

		tracing::info!(%group_id, user_id, "Group member removed.");

		Ok(())
	}

	pub async fn register_user(&self, user_id: &str) -> Result<()> {
		let user_id = validate::user_id("$.user_id", user_id)?;
		let (pool, user) = (&self.db.pool, user_id.as_str());

		self.db.retrying(move || queries::ensure_user(pool, user)).await?;

		tracing::info!(user_id = user, "User registered.");

		Ok(())
	}

	/// Removes a user. Their notes stay behind without an owner and their memberships end.
	pub async fn remove_user(&self, user_id: &str) -> Result<()> {
		let pool = &self.db.pool;
		let removed = self.db.retrying(move || queries::delete_user(pool, user_id)).await?;

		if !removed {
			return Err(Error::NotFound { message: format!("User {user_id} not found.") });
		}

		tracing::info!(user_id, "User removed.");

		Ok(())
	}
}
