//! Ledger record primitives.
//!
//! Two record families live in the append-only `ledger_entries` table:
//!
//! - [`FundTransaction`]: capital injected into (`fund_in`) or withdrawn from
//!   (`fund_out`) a domain's operating fund.
//! - [`AccountTransaction`]: operating `income`/`expense`, numbered and
//!   categorized.
//!
//! Amounts are stored as positive integer minor units; the sign comes from
//! the [`EntryKind`]. Records are immutable once appended.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Domain, EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    FundIn,
    FundOut,
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FundIn => "fund_in",
            Self::FundOut => "fund_out",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// `true` for kinds that increase the balance.
    pub fn is_inflow(self) -> bool {
        matches!(self, Self::FundIn | Self::Income)
    }

    /// Applies the kind's sign to a positive amount.
    pub fn signed(self, amount: Money) -> Money {
        if self.is_inflow() { amount } else { -amount }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "fund_in" => Ok(Self::FundIn),
            "fund_out" => Ok(Self::FundOut),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::validation(
                "kind",
                format!("invalid entry kind: {other}"),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundDirection {
    In,
    Out,
}

impl From<FundDirection> for EntryKind {
    fn from(value: FundDirection) -> Self {
        match value {
            FundDirection::In => Self::FundIn,
            FundDirection::Out => Self::FundOut,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Income,
    Expense,
}

impl From<AccountKind> for EntryKind {
    fn from(value: AccountKind) -> Self {
        match value {
            AccountKind::Income => Self::Income,
            AccountKind::Expense => Self::Expense,
        }
    }
}

/// A capital movement in or out of a domain's fund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundTransaction {
    pub id: i64,
    pub domain: Domain,
    pub direction: FundDirection,
    pub amount: Money,
    pub purpose: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// An operating income or expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTransaction {
    pub id: i64,
    pub domain: Domain,
    pub transaction_number: String,
    pub kind: AccountKind,
    /// Category label, denormalized at write time.
    pub category: String,
    pub category_id: Option<i64>,
    pub amount: Money,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Any record of the store, in the shape the balance and report code folds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum LedgerRecord {
    Fund(FundTransaction),
    Account(AccountTransaction),
}

impl LedgerRecord {
    pub fn id(&self) -> i64 {
        match self {
            Self::Fund(tx) => tx.id,
            Self::Account(tx) => tx.id,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Fund(tx) => tx.direction.into(),
            Self::Account(tx) => tx.kind.into(),
        }
    }

    /// Positive amount as entered.
    pub fn amount(&self) -> Money {
        match self {
            Self::Fund(tx) => tx.amount,
            Self::Account(tx) => tx.amount,
        }
    }

    /// Amount with the balance effect applied.
    pub fn signed_amount(&self) -> Money {
        self.kind().signed(self.amount())
    }

    pub fn transaction_date(&self) -> NaiveDate {
        match self {
            Self::Fund(tx) => tx.transaction_date,
            Self::Account(tx) => tx.transaction_date,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Fund(tx) => tx.description.as_deref(),
            Self::Account(tx) => tx.description.as_deref(),
        }
    }

    /// The category label; fund movements are classified by purpose.
    pub fn category(&self) -> &str {
        match self {
            Self::Fund(tx) => &tx.purpose,
            Self::Account(tx) => &tx.category,
        }
    }

    pub fn transaction_number(&self) -> Option<&str> {
        match self {
            Self::Fund(_) => None,
            Self::Account(tx) => Some(&tx.transaction_number),
        }
    }

    pub fn created_by(&self) -> &str {
        match self {
            Self::Fund(tx) => &tx.created_by,
            Self::Account(tx) => &tx.created_by,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub domain: String,
    pub kind: String,
    pub transaction_number: Option<String>,
    pub purpose: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<i64>,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub transaction_date: Date,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LedgerRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let domain = Domain::try_from(model.domain.as_str())?;
        let amount = Money::new(model.amount_minor);
        let record = match EntryKind::try_from(model.kind.as_str())? {
            kind @ (EntryKind::FundIn | EntryKind::FundOut) => Self::Fund(FundTransaction {
                id: model.id,
                domain,
                direction: if kind == EntryKind::FundIn {
                    FundDirection::In
                } else {
                    FundDirection::Out
                },
                amount,
                purpose: model.purpose.unwrap_or_default(),
                description: model.description,
                transaction_date: model.transaction_date,
                created_by: model.created_by,
                created_at: model.created_at,
            }),
            kind @ (EntryKind::Income | EntryKind::Expense) => {
                Self::Account(AccountTransaction {
                    id: model.id,
                    domain,
                    transaction_number: model.transaction_number.ok_or_else(|| {
                        EngineError::NotFound(format!(
                            "transaction number of record {}",
                            model.id
                        ))
                    })?,
                    kind: if kind == EntryKind::Income {
                        AccountKind::Income
                    } else {
                        AccountKind::Expense
                    },
                    category: model.category.unwrap_or_default(),
                    category_id: model.category_id,
                    amount,
                    description: model.description,
                    transaction_date: model.transaction_date,
                    created_by: model.created_by,
                    created_at: model.created_at,
                })
            }
        };
        Ok(record)
    }
}

impl TryFrom<Model> for FundTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        match LedgerRecord::try_from(model)? {
            LedgerRecord::Fund(tx) => Ok(tx),
            LedgerRecord::Account(_) => Err(EngineError::NotFound(format!("fund record {id}"))),
        }
    }
}

impl TryFrom<Model> for AccountTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        match LedgerRecord::try_from(model)? {
            LedgerRecord::Account(tx) => Ok(tx),
            LedgerRecord::Fund(_) => Err(EngineError::NotFound(format!("account record {id}"))),
        }
    }
}
