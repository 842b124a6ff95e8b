//! Repositories for database operations
//!
//! Read, list, and delete are identical across entities, so they live on a
//! single repository parameterized by a table descriptor; only create and
//! update are entity-specific and sit in inherent impls per entity.

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use std::marker::PhantomData;
use uuid::Uuid;

pub mod building;
pub mod goal;
pub mod profile;

pub use building::BuildingRepository;
pub use goal::GoalRepository;
pub use profile::ProfileRepository;

/// Table descriptor for an entity stored in its own table
pub trait TableEntity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Table name
    const TABLE: &'static str;
    /// Column list selected for this entity
    const COLUMNS: &'static str;
    /// Ordering applied to list queries
    const ORDER_BY: &'static str = "created_at DESC";
}

/// Marker for entities partitioned by `user_id`
pub trait OwnedEntity: TableEntity {}

/// Generic repository over a table descriptor
pub struct CrudRepository<E> {
    pool: PgPool,
    _entity: PhantomData<E>,
}

impl<E> Clone for CrudRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: TableEntity> CrudRepository<E> {
    /// Create a new repository over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get all rows of the entity's table
    pub async fn get_all(&self) -> Result<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            E::ORDER_BY
        );
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.pool).await?;

        Ok(rows)
    }

    /// Find a row by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Delete a row by ID
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

impl<E: OwnedEntity> CrudRepository<E> {
    /// Get all rows belonging to a user
    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            E::ORDER_BY
        );
        let rows = sqlx::query_as::<_, E>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
