use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::ProfileRecord;

/// Sea-ORM entity for the `profiles` table.
///
/// Attribute columns are nullable: rows written by older clients may lack any
/// of them, and readers must cope.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text", nullable)]
    pub username: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub name: Option<String>,
    pub age: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub city: Option<String>,
    pub interests: Option<Json>, // JSONB array of strings
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ProfileRecord {
    fn from(model: Model) -> Self {
        // A malformed interests column is treated like a missing one.
        let interests = model
            .interests
            .and_then(|json| serde_json::from_value::<Vec<String>>(json).ok());

        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            age: model.age,
            city: model.city,
            interests,
        }
    }
}

impl From<ProfileRecord> for ActiveModel {
    fn from(record: ProfileRecord) -> Self {
        ActiveModel {
            id: Set(record.id),
            username: Set(record.username),
            name: Set(record.name),
            age: Set(record.age),
            city: Set(record.city),
            interests: Set(record.interests.map(serde_json::Value::from)),
            updated_at: Set(chrono::Utc::now().into()),
        }
    }
}
