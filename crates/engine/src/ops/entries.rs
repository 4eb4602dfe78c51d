use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*,
};

use crate::{
    AccountCmd, AccountKind, AccountTransaction, Domain, EngineError, EntryKind, FundCmd,
    FundDirection, FundTransaction, Money, ResultEngine, records,
    util::{normalize_optional_text, require_positive, require_text},
};

use super::{Engine, balances::Window, with_tx};

/// Validated payload of a record, before id and number are assigned.
struct NewRecord {
    domain: Domain,
    kind: EntryKind,
    amount: Money,
    purpose: Option<String>,
    category: Option<String>,
    category_id: Option<i64>,
    description: Option<String>,
    transaction_date: NaiveDate,
    actor: String,
    recorded_at: DateTime<Utc>,
}

impl NewRecord {
    fn into_active_model(self, transaction_number: Option<String>) -> records::ActiveModel {
        records::ActiveModel {
            id: ActiveValue::NotSet,
            domain: ActiveValue::Set(self.domain.as_str().to_string()),
            kind: ActiveValue::Set(self.kind.as_str().to_string()),
            transaction_number: ActiveValue::Set(transaction_number),
            purpose: ActiveValue::Set(self.purpose),
            category: ActiveValue::Set(self.category),
            category_id: ActiveValue::Set(self.category_id),
            amount_minor: ActiveValue::Set(self.amount.minor()),
            description: ActiveValue::Set(self.description),
            transaction_date: ActiveValue::Set(self.transaction_date),
            created_by: ActiveValue::Set(self.actor),
            created_at: ActiveValue::Set(self.recorded_at),
        }
    }
}

impl Engine {
    /// Inject capital into a domain's fund.
    pub async fn add_fund(&self, cmd: FundCmd) -> ResultEngine<FundTransaction> {
        let record = Self::fund_record(cmd, FundDirection::In)?;
        let model = self.append(record, None).await?;
        FundTransaction::try_from(model)
    }

    /// Withdraw capital from a domain's fund.
    ///
    /// Fails with [`EngineError::InsufficientBalance`] when the amount
    /// exceeds the balance computed from every prior record of the domain.
    pub async fn withdraw_fund(&self, cmd: FundCmd) -> ResultEngine<FundTransaction> {
        let record = Self::fund_record(cmd, FundDirection::Out)?;
        let model = self.append(record, None).await?;
        FundTransaction::try_from(model)
    }

    /// Record an operating expense. Same balance rule as
    /// [`withdraw_fund`](Self::withdraw_fund); an unknown category label is
    /// created on the fly.
    pub async fn add_expense(&self, cmd: AccountCmd) -> ResultEngine<AccountTransaction> {
        let label = cmd.category.clone();
        let category_id = cmd.category_id;
        let record = Self::account_record(cmd, AccountKind::Expense)?;
        let model = self.append(record, Some((label, category_id))).await?;
        AccountTransaction::try_from(model)
    }

    /// Record an operating income.
    pub async fn add_income(&self, cmd: AccountCmd) -> ResultEngine<AccountTransaction> {
        let label = cmd.category.clone();
        let category_id = cmd.category_id;
        let record = Self::account_record(cmd, AccountKind::Income)?;
        let model = self.append(record, Some((label, category_id))).await?;
        AccountTransaction::try_from(model)
    }

    fn fund_record(cmd: FundCmd, direction: FundDirection) -> ResultEngine<NewRecord> {
        require_positive(cmd.amount)?;
        let purpose = require_text("purpose", &cmd.purpose)?;
        let actor = require_text("actor", &cmd.actor)?;
        Ok(NewRecord {
            domain: cmd.domain,
            kind: direction.into(),
            amount: cmd.amount,
            purpose: Some(purpose),
            category: None,
            category_id: None,
            description: normalize_optional_text(cmd.description.as_deref()),
            transaction_date: cmd.transaction_date,
            actor,
            recorded_at: cmd.recorded_at,
        })
    }

    fn account_record(cmd: AccountCmd, kind: AccountKind) -> ResultEngine<NewRecord> {
        require_positive(cmd.amount)?;
        let actor = require_text("actor", &cmd.actor)?;
        if cmd.category_id.is_none() && normalize_optional_text(cmd.category.as_deref()).is_none()
        {
            return Err(EngineError::validation("category", "category is required"));
        }
        Ok(NewRecord {
            domain: cmd.domain,
            kind: kind.into(),
            amount: cmd.amount,
            purpose: None,
            category: None,
            category_id: None,
            description: normalize_optional_text(cmd.description.as_deref()),
            transaction_date: cmd.transaction_date,
            actor,
            recorded_at: cmd.recorded_at,
        })
    }

    /// Conditional append: balance check, category resolution, numbering and
    /// insert run under the domain lock inside one DB transaction. Any error
    /// drops the transaction, so nothing partial is ever committed.
    async fn append(
        &self,
        mut record: NewRecord,
        category: Option<(Option<String>, Option<i64>)>,
    ) -> ResultEngine<records::Model> {
        let domain = record.domain;
        let _guard = self.lock_domain(domain).await?;

        with_tx!(self, |db_tx| {
            let available = Self::signed_sum(&db_tx, domain, Window::default()).await?;
            if record.kind.is_inflow() && available.checked_add(record.amount).is_none() {
                tracing::warn!(
                    %domain,
                    kind = record.kind.as_str(),
                    requested = %record.amount,
                    %available,
                    "rejected credit overflowing balance"
                );
                return Err(EngineError::overflow());
            }
            if !record.kind.is_inflow() && record.amount > available {
                tracing::warn!(
                    %domain,
                    kind = record.kind.as_str(),
                    requested = %record.amount,
                    %available,
                    "rejected debit exceeding balance"
                );
                return Err(EngineError::InsufficientBalance {
                    requested: record.amount,
                    available,
                });
            }

            let transaction_number = match category {
                Some((label, id)) => {
                    let selection = Self::resolve_category(
                        &db_tx,
                        label.as_deref(),
                        id,
                        record.recorded_at,
                    )
                    .await?;
                    record.category = Some(selection.label);
                    record.category_id = Some(selection.id);
                    Some(
                        Self::next_transaction_number(&db_tx, domain, record.recorded_at)
                            .await?,
                    )
                }
                None => None,
            };

            let kind = record.kind;
            let amount = record.amount;
            let model = record
                .into_active_model(transaction_number)
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_write(err, "ledger record"))?;

            tracing::info!(
                %domain,
                id = model.id,
                kind = kind.as_str(),
                %amount,
                number = model.transaction_number.as_deref().unwrap_or("-"),
                "appended ledger record"
            );
            Ok(model)
        })
    }

    /// `<CODE>-<YYYYMMDD>-<NNNN>`, counting the domain's numbers of the
    /// recording day. Only called under the domain lock.
    async fn next_transaction_number(
        db_tx: &DatabaseTransaction,
        domain: Domain,
        recorded_at: DateTime<Utc>,
    ) -> ResultEngine<String> {
        let prefix = format!("{}-{}-", domain.code(), recorded_at.format("%Y%m%d"));
        let issued = records::Entity::find()
            .filter(records::Column::Domain.eq(domain.as_str()))
            .filter(records::Column::TransactionNumber.starts_with(&prefix))
            .count(db_tx)
            .await?;
        Ok(format!("{prefix}{:04}", issued + 1))
    }
}
