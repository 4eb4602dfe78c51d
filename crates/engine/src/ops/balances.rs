use chrono::NaiveDate;
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
    prelude::*,
};

use crate::{Domain, EngineError, EntryKind, LedgerRecord, Money, ResultEngine, records};

use super::{Engine, with_tx};

/// Date bounds (inclusive) and snapshot bound of a store read.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct Window {
    pub(super) from: Option<NaiveDate>,
    pub(super) to: Option<NaiveDate>,
    pub(super) snapshot: Option<i64>,
}

impl Window {
    pub(super) fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            snapshot: None,
        }
    }

    pub(super) fn until(to: NaiveDate) -> Self {
        Self {
            to: Some(to),
            ..Default::default()
        }
    }

    fn apply(self, mut query: Select<records::Entity>) -> Select<records::Entity> {
        if let Some(from) = self.from {
            query = query.filter(records::Column::TransactionDate.gte(from));
        }
        if let Some(to) = self.to {
            query = query.filter(records::Column::TransactionDate.lte(to));
        }
        if let Some(snapshot) = self.snapshot {
            query = query.filter(records::Column::Id.lte(snapshot));
        }
        query
    }
}

impl Engine {
    /// Current balance of `domain`: the signed sum of every committed record,
    /// regardless of transaction date.
    ///
    /// Read from a single DB transaction, never from a stored counter.
    pub async fn balance(&self, domain: Domain) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            Self::signed_sum(&db_tx, domain, Window::default()).await
        })
    }

    /// Signed sum of the records of `domain` inside `window`.
    pub(super) async fn signed_sum(
        db: &DatabaseTransaction,
        domain: Domain,
        window: Window,
    ) -> ResultEngine<Money> {
        let query = records::Entity::find()
            .select_only()
            .column(records::Column::Kind)
            .column(records::Column::AmountMinor)
            .filter(records::Column::Domain.eq(domain.as_str()));
        let rows: Vec<(String, i64)> = window.apply(query).into_tuple().all(db).await?;

        rows.into_iter()
            .try_fold(Money::ZERO, |acc, (kind, amount_minor)| {
                let kind = EntryKind::try_from(kind.as_str())?;
                acc.checked_add(kind.signed(Money::new(amount_minor)))
                    .ok_or_else(EngineError::overflow)
            })
    }

    /// Balance of every record dated strictly before `date`.
    pub(super) async fn opening_balance(
        db: &DatabaseTransaction,
        domain: Domain,
        date: NaiveDate,
        snapshot: Option<i64>,
    ) -> ResultEngine<Money> {
        let Some(day_before) = date.pred_opt() else {
            return Ok(Money::ZERO);
        };
        let window = Window {
            snapshot,
            ..Window::until(day_before)
        };
        Self::signed_sum(db, domain, window).await
    }

    /// Records of `domain` inside `window`, ascending by
    /// `(transaction_date, id)`.
    pub(super) async fn load_records(
        db: &DatabaseTransaction,
        domain: Domain,
        window: Window,
    ) -> ResultEngine<Vec<LedgerRecord>> {
        let query = records::Entity::find()
            .filter(records::Column::Domain.eq(domain.as_str()))
            .order_by_asc(records::Column::TransactionDate)
            .order_by_asc(records::Column::Id);
        let models = window.apply(query).all(db).await?;
        models.into_iter().map(LedgerRecord::try_from).collect()
    }

    /// Highest record id of `domain`, `0` for an unused domain.
    pub(super) async fn latest_id(db: &DatabaseTransaction, domain: Domain) -> ResultEngine<i64> {
        let latest = records::Entity::find()
            .filter(records::Column::Domain.eq(domain.as_str()))
            .order_by_desc(records::Column::Id)
            .one(db)
            .await?;
        Ok(latest.map_or(0, |model| model.id))
    }
}
