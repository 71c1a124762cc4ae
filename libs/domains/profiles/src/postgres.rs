use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use database::postgres::check_health;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity;
use crate::error::{ProfileError, ProfileResult};
use crate::models::ProfileRecord;
use crate::store::{ProfilePage, ProfileStore, ProfileWriter};

/// PostgreSQL-backed profile store
#[derive(Clone)]
pub struct PgProfileStore {
    db: DatabaseConnection,
}

impl PgProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, id: Uuid) -> ProfileResult<Option<ProfileRecord>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_page(&self, after: Option<Uuid>, limit: usize) -> ProfileResult<ProfilePage> {
        if limit == 0 {
            return Err(ProfileError::InvalidPageSize(limit));
        }

        let mut query = entity::Entity::find();
        if let Some(after) = after {
            query = query.filter(entity::Column::Id.gt(after));
        }

        // One extra row tells us whether another page follows.
        let mut models = query
            .order_by_asc(entity::Column::Id)
            .limit(limit as u64 + 1)
            .all(&self.db)
            .await?;

        let next = if models.len() > limit {
            models.truncate(limit);
            models.last().map(|m| m.id)
        } else {
            None
        };

        tracing::debug!(count = models.len(), ?after, ?next, "Listed profile page");

        Ok(ProfilePage {
            records: models.into_iter().map(Into::into).collect(),
            next,
        })
    }

    async fn ping(&self) -> ProfileResult<()> {
        check_health(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileWriter for PgProfileStore {
    async fn save(&self, record: ProfileRecord) -> ProfileResult<()> {
        let id = record.id;
        let active_model: entity::ActiveModel = record.into();

        entity::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(entity::Column::Id)
                    .update_columns([
                        entity::Column::Username,
                        entity::Column::Name,
                        entity::Column::Age,
                        entity::Column::City,
                        entity::Column::Interests,
                        entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        tracing::info!(profile_id = %id, "Saved profile");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> ProfileResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;
        let removed = result.rows_affected > 0;
        if removed {
            tracing::info!(profile_id = %id, "Deleted profile");
        }
        Ok(removed)
    }
}
