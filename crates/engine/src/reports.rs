//! Calendar-bucketed summaries.
//!
//! Pure folds over loaded records; the engine decides which records (month,
//! window, as-of date) go in.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{AccountKind, EngineError, EntryKind, LedgerRecord, Money, ResultEngine, util::month_bounds};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub fund_in: Money,
    pub fund_out: Money,
    pub income: Money,
    pub expense: Money,
    /// `income - expense`; fund movements are capital, not operations.
    pub net: Money,
    /// Balance of every record dated before the first day of the month.
    pub opening: Money,
    /// `opening` plus every movement dated within the month.
    pub closing: Money,
    pub count: u64,
}

impl MonthlyReport {
    /// Operating margin of the month, in percent.
    pub fn profit_margin(&self) -> f64 {
        profit_margin(self.income, self.expense)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySort {
    /// Label ascending.
    ByName,
    /// Total descending, ties by label ascending ("top categories").
    ByAmountDesc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub label: String,
    pub total: Money,
    pub count: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTrend {
    pub year: i32,
    pub month: u32,
    pub income: Money,
    pub expense: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub inflow: Money,
    pub outflow: Money,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub as_of: Option<NaiveDate>,
    pub fund_in: Money,
    pub fund_out: Money,
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

/// `(sales - purchases) / sales * 100`, defined as `0` when there are no
/// sales.
pub fn profit_margin(sales: Money, purchases: Money) -> f64 {
    if sales.is_zero() {
        return 0.0;
    }
    (sales.minor() as f64 - purchases.minor() as f64) / sales.minor() as f64 * 100.0
}

fn add(total: &mut Money, amount: Money) -> ResultEngine<()> {
    *total = total.checked_add(amount).ok_or_else(EngineError::overflow)?;
    Ok(())
}

/// Builds the report of one month from the records dated within it.
pub fn monthly_report(
    year: i32,
    month: u32,
    opening: Money,
    records: &[LedgerRecord],
) -> ResultEngine<MonthlyReport> {
    let sheet = balance_sheet(None, records)?;
    Ok(MonthlyReport {
        year,
        month,
        fund_in: sheet.fund_in,
        fund_out: sheet.fund_out,
        income: sheet.income,
        expense: sheet.expense,
        net: sheet
            .income
            .checked_sub(sheet.expense)
            .ok_or_else(EngineError::overflow)?,
        opening,
        closing: opening
            .checked_add(sheet.balance)
            .ok_or_else(EngineError::overflow)?,
        count: records.len() as u64,
    })
}

/// Per-kind totals and the resulting balance of `records`.
pub fn balance_sheet(
    as_of: Option<NaiveDate>,
    records: &[LedgerRecord],
) -> ResultEngine<BalanceSheet> {
    let mut sheet = BalanceSheet {
        as_of,
        ..Default::default()
    };
    for record in records {
        let amount = record.amount();
        let total = match record.kind() {
            EntryKind::FundIn => &mut sheet.fund_in,
            EntryKind::FundOut => &mut sheet.fund_out,
            EntryKind::Income => &mut sheet.income,
            EntryKind::Expense => &mut sheet.expense,
        };
        add(total, amount)?;
        add(&mut sheet.balance, record.signed_amount())?;
    }
    Ok(sheet)
}

/// Groups account records of `kind` by category label.
pub fn category_breakdown(
    records: &[LedgerRecord],
    kind: AccountKind,
    sort: CategorySort,
) -> ResultEngine<Vec<CategoryTotal>> {
    let kind = EntryKind::from(kind);
    let mut groups: HashMap<&str, (Money, u64)> = HashMap::new();
    for record in records.iter().filter(|r| r.kind() == kind) {
        let entry = groups.entry(record.category()).or_insert((Money::ZERO, 0));
        add(&mut entry.0, record.amount())?;
        entry.1 += 1;
    }

    let mut out: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(label, (total, count))| CategoryTotal {
            label: label.to_string(),
            total,
            count,
        })
        .collect();
    match sort {
        CategorySort::ByName => out.sort_by(|a, b| a.label.cmp(&b.label)),
        CategorySort::ByAmountDesc => {
            out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)))
        }
    }
    Ok(out)
}

/// Income/expense per month for every `(year, month)` in `months`, zero
/// filled.
pub fn trend(months: &[(i32, u32)], records: &[LedgerRecord]) -> ResultEngine<Vec<MonthTrend>> {
    let mut buckets: BTreeMap<(i32, u32), MonthTrend> = months
        .iter()
        .map(|&(year, month)| {
            (
                (year, month),
                MonthTrend {
                    year,
                    month,
                    income: Money::ZERO,
                    expense: Money::ZERO,
                },
            )
        })
        .collect();

    for record in records {
        let date = record.transaction_date();
        let Some(bucket) = buckets.get_mut(&(date.year(), date.month())) else {
            continue;
        };
        match record.kind() {
            EntryKind::Income => add(&mut bucket.income, record.amount())?,
            EntryKind::Expense => add(&mut bucket.expense, record.amount())?,
            EntryKind::FundIn | EntryKind::FundOut => {}
        }
    }

    Ok(buckets.into_values().collect())
}

/// Inflow/outflow for every day of the month, zero filled.
pub fn daily_totals(
    year: i32,
    month: u32,
    records: &[LedgerRecord],
) -> ResultEngine<Vec<DailyTotal>> {
    let (first, last) = month_bounds(year, month)?;
    let mut days: BTreeMap<NaiveDate, DailyTotal> = first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|date| {
            (
                date,
                DailyTotal {
                    date,
                    inflow: Money::ZERO,
                    outflow: Money::ZERO,
                },
            )
        })
        .collect();

    for record in records {
        let Some(day) = days.get_mut(&record.transaction_date()) else {
            continue;
        };
        let total = if record.kind().is_inflow() {
            &mut day.inflow
        } else {
            &mut day.outflow
        };
        add(total, record.amount())?;
    }

    Ok(days.into_values().collect())
}
