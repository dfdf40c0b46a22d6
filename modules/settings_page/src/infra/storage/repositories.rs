//! SeaORM repository implementations

use crate::contract::OptionRecord;
use crate::domain::repository::OptionStore;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, ColumnTrait};
use std::sync::Arc;

use super::{entity, mapper};

// ===== Option Store =====

pub struct SeaOrmOptionStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmOptionStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OptionStore for SeaOrmOptionStore {
    async fn read(&self, name: &str) -> Result<Option<OptionRecord>> {
        let result = entity::Entity::find_by_id(name.to_string())
            .one(&*self.db)
            .await?;

        result.map(mapper::record_from_model).transpose()
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let count = entity::Entity::find()
            .filter(entity::Column::OptionName.eq(name))
            .count(&*self.db)
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, name: &str) -> Result<()> {
        if self.exists(name).await? {
            return Ok(());
        }

        let active = mapper::new_active_model(name, &OptionRecord::new(), chrono::Utc::now());
        entity::Entity::insert(active).exec(&*self.db).await?;
        Ok(())
    }

    async fn update(&self, name: &str, record: &OptionRecord) -> Result<()> {
        let now = chrono::Utc::now();
        let existing = entity::Entity::find_by_id(name.to_string())
            .one(&*self.db)
            .await?;

        match existing {
            Some(existing) => {
                let active = mapper::updated_active_model(existing, record, now);
                entity::Entity::update(active).exec(&*self.db).await?;
            }
            None => {
                let active = mapper::new_active_model(name, record, now);
                entity::Entity::insert(active).exec(&*self.db).await?;
            }
        }
        Ok(())
    }
}
