use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{Error, Result, models::Category};

pub async fn insert_category<'e, E>(executor: E, category: &Category) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO categories (category_id, title, created_at) VALUES ($1, $2, $3)")
		.bind(category.category_id)
		.bind(category.title.as_str())
		.bind(category.created_at)
		.execute(executor)
		.await
		.map_err(|err| {
			Error::on_write(err, "Category title already exists.", "Category not found.")
		})?;

	Ok(())
}

pub async fn category_exists<'e, E>(executor: E, category_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let exists: bool =
		sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE category_id = $1)")
			.bind(category_id)
			.fetch_one(executor)
			.await?;

	Ok(exists)
}

pub async fn list_categories<'e, E>(executor: E) -> Result<Vec<Category>>
where
	E: PgExecutor<'e>,
{
	let categories =
		sqlx::query_as("SELECT category_id, title, created_at FROM categories ORDER BY title ASC")
			.fetch_all(executor)
			.await?;

	Ok(categories)
}

/// Deletes a category. Notes that referenced it keep existing without a category.
pub async fn delete_category<'e, E>(executor: E, category_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
		.bind(category_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}
