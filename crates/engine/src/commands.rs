//! Command structs for engine write operations.
//!
//! These types group the parameters of `add_fund`/`withdraw_fund` and
//! `add_expense`/`add_income`, keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Domain, Money};

/// Add or withdraw capital.
#[derive(Clone, Debug)]
pub struct FundCmd {
    pub domain: Domain,
    pub amount: Money,
    pub purpose: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    /// Authenticated actor reference supplied by the caller.
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
}

impl FundCmd {
    #[must_use]
    pub fn new(
        domain: Domain,
        actor: impl Into<String>,
        amount: Money,
        purpose: impl Into<String>,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            domain,
            amount,
            purpose: purpose.into(),
            description: None,
            transaction_date,
            actor: actor.into(),
            recorded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}

/// Record an operating income or expense.
///
/// The category is given as a label, an existing category id, or both; see
/// `Engine::resolve_category` for how the pair is reconciled.
#[derive(Clone, Debug)]
pub struct AccountCmd {
    pub domain: Domain,
    pub amount: Money,
    pub category: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
}

impl AccountCmd {
    #[must_use]
    pub fn new(
        domain: Domain,
        actor: impl Into<String>,
        amount: Money,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            domain,
            amount,
            category: None,
            category_id: None,
            description: None,
            transaction_date,
            actor: actor.into(),
            recorded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}
