//! Tower and budget head repository.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;

use budgetrack_core::budget::{
    BudgetError, BudgetHead, NewBudgetHead, NewTower, Tower, types::validate_code_and_name,
};
use budgetrack_shared::types::{BudgetHeadId, TowerId};

use super::{is_unique_violation, now};
use crate::entities::{budget_heads, towers};

/// Master data repository.
#[derive(Debug, Clone)]
pub struct MasterDataRepository {
    db: DatabaseConnection,
}

impl MasterDataRepository {
    /// Creates a new master data repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists towers ordered by code.
    pub async fn list_towers(&self) -> Result<Vec<Tower>, BudgetError> {
        let models = towers::Entity::find()
            .order_by_asc(towers::Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_tower).collect())
    }

    /// Creates a tower.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::DuplicateCode` if the code is taken.
    pub async fn create_tower(&self, input: NewTower) -> Result<Tower, BudgetError> {
        validate_code_and_name(&input.code, &input.name)?;
        let code = input.code.trim().to_string();

        let model = towers::ActiveModel {
            id: Set(TowerId::new().into_inner()),
            code: Set(code.clone()),
            name: Set(input.name.trim().to_string()),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BudgetError::DuplicateCode(code.clone())
            } else {
                BudgetError::repository(e.to_string())
            }
        })?;

        info!(tower_id = %model.id, code = %model.code, "Tower created");
        Ok(to_tower(model))
    }

    /// Lists budget heads ordered by code, optionally for one tower.
    pub async fn list_budget_heads(
        &self,
        tower_id: Option<TowerId>,
    ) -> Result<Vec<BudgetHead>, BudgetError> {
        let mut query = budget_heads::Entity::find();
        if let Some(tower_id) = tower_id {
            query = query.filter(budget_heads::Column::TowerId.eq(tower_id.into_inner()));
        }

        let models = query
            .order_by_asc(budget_heads::Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_budget_head).collect())
    }

    /// Creates a budget head.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::TowerNotFound` for an unknown tower and
    /// `BudgetError::DuplicateCode` if the code is taken.
    pub async fn create_budget_head(&self, input: NewBudgetHead) -> Result<BudgetHead, BudgetError> {
        validate_code_and_name(&input.code, &input.name)?;
        let code = input.code.trim().to_string();

        if let Some(tower_id) = input.tower_id {
            let exists = towers::Entity::find_by_id(tower_id.into_inner())
                .one(&self.db)
                .await
                .map_err(|e| BudgetError::repository(e.to_string()))?
                .is_some();
            if !exists {
                return Err(BudgetError::TowerNotFound(tower_id));
            }
        }

        let model = budget_heads::ActiveModel {
            id: Set(BudgetHeadId::new().into_inner()),
            code: Set(code.clone()),
            name: Set(input.name.trim().to_string()),
            tower_id: Set(input.tower_id.map(TowerId::into_inner)),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BudgetError::DuplicateCode(code.clone())
            } else {
                BudgetError::repository(e.to_string())
            }
        })?;

        info!(budget_head_id = %model.id, code = %model.code, "Budget head created");
        Ok(to_budget_head(model))
    }
}

fn to_tower(model: towers::Model) -> Tower {
    Tower {
        id: TowerId::from_uuid(model.id),
        code: model.code,
        name: model.name,
    }
}

fn to_budget_head(model: budget_heads::Model) -> BudgetHead {
    BudgetHead {
        id: BudgetHeadId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        tower_id: model.tower_id.map(TowerId::from_uuid),
    }
}
