use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ExpenseCategory, ResultEngine, categories,
    util::{normalize_category_display, normalize_category_key},
};

use super::{Engine, with_tx};

/// Canonical `(id, label)` pair a ledger record is written with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct CategorySelection {
    pub(super) id: i64,
    pub(super) label: String,
}

impl From<&categories::Model> for CategorySelection {
    fn from(model: &categories::Model) -> Self {
        Self {
            id: model.id,
            label: model.name.clone(),
        }
    }
}

impl Engine {
    /// Reconciles a free-text category label and an optional category id.
    ///
    /// - id given: the category must exist; its stored name wins over the
    ///   label.
    /// - label only: find by normalized name, or create an active category.
    /// - neither: validation error.
    pub(super) async fn resolve_category(
        db_tx: &DatabaseTransaction,
        label: Option<&str>,
        id: Option<i64>,
        now: DateTime<Utc>,
    ) -> ResultEngine<CategorySelection> {
        if let Some(id) = id {
            let model = categories::Entity::find_by_id(id)
                .one(db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("category {id}")))?;
            return Ok(CategorySelection::from(&model));
        }

        let label = label
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::validation("category", "category is required"))?;
        let display = normalize_category_display(label)?;
        let key = normalize_category_key(&display)?;

        if let Some(model) = Self::find_category_by_key(db_tx, &key).await? {
            return Ok(CategorySelection::from(&model));
        }

        let model = Self::insert_category(db_tx, display, key, now).await?;
        tracing::info!(category = %model.name, id = model.id, "created expense category");
        Ok(CategorySelection::from(&model))
    }

    async fn find_category_by_key(
        db_tx: &DatabaseTransaction,
        key: &str,
    ) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(key))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    async fn insert_category(
        db_tx: &DatabaseTransaction,
        name: String,
        name_norm: String,
        now: DateTime<Utc>,
    ) -> ResultEngine<categories::Model> {
        let active = categories::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(name_norm),
            active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(now),
        };
        active
            .insert(db_tx)
            .await
            .map_err(|err| EngineError::from_write(err, "category"))
    }

    /// Create a category explicitly.
    pub async fn create_category(&self, name: &str) -> ResultEngine<ExpenseCategory> {
        let display = normalize_category_display(name)?;
        let key = normalize_category_key(&display)?;
        with_tx!(self, |db_tx| {
            if Self::find_category_by_key(&db_tx, &key).await?.is_some() {
                return Err(EngineError::validation(
                    "name",
                    format!("category '{display}' already exists"),
                ));
            }
            let model = Self::insert_category(&db_tx, display, key, Utc::now()).await?;
            Ok(ExpenseCategory::from(model))
        })
    }

    /// Category directory, sorted by name.
    pub async fn categories(&self, include_inactive: bool) -> ResultEngine<Vec<ExpenseCategory>> {
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find().order_by_asc(categories::Column::Name);
            if !include_inactive {
                query = query.filter(categories::Column::Active.eq(true));
            }
            let models = query.all(&db_tx).await?;
            Ok(models.into_iter().map(ExpenseCategory::from).collect())
        })
    }

    /// Activate or deactivate a category. Deactivated categories stay
    /// referenced by existing records and can still be used by id.
    pub async fn set_category_active(&self, id: i64, active: bool) -> ResultEngine<ExpenseCategory> {
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("category {id}")))?;
            let mut active_model: categories::ActiveModel = model.into();
            active_model.active = ActiveValue::Set(active);
            let model = active_model.update(&db_tx).await?;
            Ok(ExpenseCategory::from(model))
        })
    }
}
