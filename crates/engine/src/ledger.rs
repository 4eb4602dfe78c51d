//! Running-balance ledger views.
//!
//! Everything here is a pure function over already loaded records. The
//! engine loads a consistent snapshot of the store and hands it over, so the
//! same code renders the Medicine, Operation and House-Security ledgers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, EntryKind, LedgerRecord, Money, ResultEngine};

/// Upper bound for `page_size`.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Conjunction of predicates selecting ledger records.
///
/// Text predicates are case-insensitive. `date_from` and `date_to` are both
/// inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Substring of the record description.
    pub description: Option<String>,
    /// Exact category label (purpose for fund movements).
    pub category: Option<String>,
    /// Substring of transaction number, description or category.
    pub search: Option<String>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<EntryKind>>,
}

impl LedgerFilter {
    pub fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to)
            && to < from
        {
            return Err(EngineError::validation(
                "date_to",
                "date_to must not be before date_from",
            ));
        }
        if self.kinds.as_ref().is_some_and(|k| k.is_empty()) {
            return Err(EngineError::validation("kinds", "kinds must not be empty"));
        }
        Ok(())
    }

    pub fn matches(&self, record: &LedgerRecord) -> bool {
        let date = record.transaction_date();
        if self.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| date > to) {
            return false;
        }
        if let Some(kinds) = &self.kinds
            && !kinds.contains(&record.kind())
        {
            return false;
        }
        self.matches_text(record)
    }

    fn matches_text(&self, record: &LedgerRecord) -> bool {
        let description = record.description().unwrap_or_default().to_lowercase();

        if let Some(needle) = non_blank(self.description.as_deref())
            && !description.contains(&needle)
        {
            return false;
        }
        if let Some(category) = non_blank(self.category.as_deref())
            && record.category().to_lowercase() != category
        {
            return false;
        }
        if let Some(needle) = non_blank(self.search.as_deref()) {
            let number = record.transaction_number().unwrap_or_default().to_lowercase();
            let category = record.category().to_lowercase();
            if !(number.contains(&needle)
                || description.contains(&needle)
                || category.contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// One line of a running-balance ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub record: LedgerRecord,
    /// Running balance immediately before this row.
    pub previous_balance: Money,
    /// Signed movement of the row.
    pub amount: Money,
    /// `previous_balance + amount`.
    pub balance: Money,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub opening: Money,
    pub total_movement: Money,
    pub final_balance: Money,
}

/// A page of the ledger view. Rows are newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPage {
    pub rows: Vec<LedgerRow>,
    pub totals: LedgerTotals,
    pub page: u64,
    pub page_size: u64,
    pub total_rows: u64,
    /// Highest record id visible to this view. Pass it back to fetch the
    /// following pages of the same snapshot.
    pub snapshot: i64,
}

/// Ledger view request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerQuery {
    pub filter: LedgerFilter,
    /// 1-based.
    pub page: u64,
    pub page_size: u64,
    pub snapshot: Option<i64>,
}

impl Default for LedgerQuery {
    fn default() -> Self {
        Self {
            filter: LedgerFilter::default(),
            page: 1,
            page_size: 25,
            snapshot: None,
        }
    }
}

/// Sorts records by `(transaction_date, id)` ascending, the order running
/// balances are folded in.
pub fn sort_chronologically(records: &mut [LedgerRecord]) {
    records.sort_by_key(|record| (record.transaction_date(), record.id()));
}

/// Folds records (already in chronological order) into ledger rows, starting
/// from `opening`.
pub fn running_balance<I>(opening: Money, records: I) -> ResultEngine<Vec<LedgerRow>>
where
    I: IntoIterator<Item = LedgerRecord>,
{
    let mut balance = opening;
    records
        .into_iter()
        .map(|record| {
            let previous_balance = balance;
            let amount = record.signed_amount();
            balance = previous_balance
                .checked_add(amount)
                .ok_or_else(EngineError::overflow)?;
            Ok(LedgerRow {
                record,
                previous_balance,
                amount,
                balance,
            })
        })
        .collect()
}

/// Totals for a running-balance sequence.
///
/// `final_balance` is read from the last row rather than re-summed.
pub fn compute_totals(opening: Money, rows: &[LedgerRow]) -> ResultEngine<LedgerTotals> {
    let total_movement = rows.iter().try_fold(Money::ZERO, |acc, row| {
        acc.checked_add(row.amount).ok_or_else(EngineError::overflow)
    })?;
    Ok(LedgerTotals {
        opening,
        total_movement,
        final_balance: rows.last().map_or(opening, |row| row.balance),
    })
}

/// Cuts page `page` (1-based) out of `items`.
pub fn paginate<T>(items: &[T], page: u64, page_size: u64) -> ResultEngine<&[T]> {
    if page == 0 {
        return Err(EngineError::validation("page", "page starts at 1"));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(EngineError::validation(
            "page_size",
            format!("page_size must be in 1..={MAX_PAGE_SIZE}"),
        ));
    }
    let start = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
    if start >= items.len() {
        return Ok(&[]);
    }
    let end = start.saturating_add(page_size as usize).min(items.len());
    Ok(&items[start..end])
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::{AccountKind, AccountTransaction, Domain, FundDirection, FundTransaction};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn fund(id: i64, direction: FundDirection, amount: i64, day: u32) -> LedgerRecord {
        LedgerRecord::Fund(FundTransaction {
            id,
            domain: Domain::HouseSecurity,
            direction,
            amount: Money::new(amount),
            purpose: "Guard salary fund".to_string(),
            description: Some(format!("fund {id}")),
            transaction_date: date(day),
            created_by: "admin".to_string(),
            created_at: Utc.timestamp_opt(1_780_000_000 + id, 0).unwrap(),
        })
    }

    fn expense(id: i64, amount: i64, day: u32, category: &str) -> LedgerRecord {
        LedgerRecord::Account(AccountTransaction {
            id,
            domain: Domain::HouseSecurity,
            transaction_number: format!("HSL-202606{day:02}-{id:04}"),
            kind: AccountKind::Expense,
            category: category.to_string(),
            category_id: None,
            amount: Money::new(amount),
            description: Some(format!("Night shift {id}")),
            transaction_date: date(day),
            created_by: "admin".to_string(),
            created_at: Utc.timestamp_opt(1_780_000_000 + id, 0).unwrap(),
        })
    }

    #[test]
    fn running_balance_chains_rows() {
        let rows = running_balance(
            Money::ZERO,
            vec![
                fund(1, FundDirection::In, 100_000, 1),
                expense(2, 30_000, 2, "Salary"),
                fund(3, FundDirection::Out, 70_000, 3),
            ],
        )
        .unwrap();
        let balances: Vec<i64> = rows.iter().map(|r| r.balance.minor()).collect();
        assert_eq!(balances, vec![100_000, 70_000, 0]);
        assert_eq!(rows[0].previous_balance, Money::ZERO);
        assert_eq!(rows[2].previous_balance, Money::new(70_000));
        assert_eq!(rows[1].amount, Money::new(-30_000));
    }

    #[test]
    fn backdated_record_sorts_before_later_dates() {
        let mut records = vec![
            fund(1, FundDirection::In, 1_000, 5),
            expense(2, 500, 3, "Salary"),
            fund(3, FundDirection::In, 200, 3),
        ];
        sort_chronologically(&mut records);
        let ids: Vec<i64> = records.iter().map(LedgerRecord::id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        // Date order shows a transient dip below zero; accepted report behavior.
        let rows = running_balance(Money::ZERO, records).unwrap();
        assert_eq!(rows[0].balance, Money::new(-500));
        assert_eq!(rows[2].balance, Money::new(700));
    }

    #[test]
    fn totals_of_empty_ledger_keep_opening() {
        let totals = compute_totals(Money::new(4_200), &[]).unwrap();
        assert_eq!(totals.final_balance, Money::new(4_200));
        assert_eq!(totals.total_movement, Money::ZERO);
    }

    #[test]
    fn overflowing_fold_is_an_error() {
        let err = running_balance(
            Money::new(i64::MAX),
            vec![fund(1, FundDirection::In, 1, 1)],
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("amount"));

        let rows = running_balance(
            Money::ZERO,
            vec![
                fund(1, FundDirection::In, i64::MAX, 1),
                fund(2, FundDirection::Out, i64::MAX, 2),
                fund(3, FundDirection::In, i64::MAX, 3),
            ],
        )
        .unwrap();
        assert_eq!(rows[2].balance, Money::new(i64::MAX));
        assert_eq!(
            compute_totals(Money::ZERO, &rows).unwrap().total_movement,
            Money::new(i64::MAX)
        );
    }

    #[test]
    fn filter_rejects_inverted_range() {
        let filter = LedgerFilter {
            date_from: Some(date(10)),
            date_to: Some(date(9)),
            ..Default::default()
        };
        assert_eq!(filter.validate().unwrap_err().field(), Some("date_to"));

        let same_day = LedgerFilter {
            date_from: Some(date(10)),
            date_to: Some(date(10)),
            ..Default::default()
        };
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn search_is_case_insensitive_over_number_description_and_category() {
        let record = expense(12, 500, 4, "Guard Uniforms");
        let by = |search: &str| LedgerFilter {
            search: Some(search.to_string()),
            ..Default::default()
        };
        assert!(by("hsl-20260604").matches(&record));
        assert!(by("NIGHT SHIFT").matches(&record));
        assert!(by("uniforms").matches(&record));
        assert!(!by("medicine").matches(&record));
        assert!(by("   ").matches(&record));
    }

    #[test]
    fn filter_combines_predicates() {
        let filter = LedgerFilter {
            date_from: Some(date(2)),
            date_to: Some(date(4)),
            category: Some("salary".to_string()),
            kinds: Some(vec![EntryKind::Expense]),
            ..Default::default()
        };
        assert!(filter.matches(&expense(1, 10, 3, "Salary")));
        assert!(!filter.matches(&expense(2, 10, 5, "Salary")));
        assert!(!filter.matches(&expense(3, 10, 3, "Fuel")));
        assert!(!filter.matches(&fund(4, FundDirection::Out, 10, 3)));
    }

    #[test]
    fn paginate_validates_and_slices() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 1, 3).unwrap(), &[1, 2, 3]);
        assert_eq!(paginate(&items, 3, 3).unwrap(), &[7]);
        assert!(paginate(&items, 4, 3).unwrap().is_empty());
        assert_eq!(paginate(&items, 0, 3).unwrap_err().field(), Some("page"));
        assert_eq!(
            paginate(&items, 1, MAX_PAGE_SIZE + 1).unwrap_err().field(),
            Some("page_size")
        );
    }

    fn arb_record() -> impl Strategy<Value = (bool, i64, u32)> {
        (any::<bool>(), 1i64..1_000_000, 1u32..=30)
    }

    proptest! {
        #[test]
        fn rows_chain_and_totals_agree(
            opening in -1_000_000i64..1_000_000,
            specs in proptest::collection::vec(arb_record(), 0..40),
        ) {
            let mut records: Vec<LedgerRecord> = specs
                .into_iter()
                .enumerate()
                .map(|(i, (inflow, amount, day))| {
                    let id = i as i64 + 1;
                    if inflow {
                        fund(id, FundDirection::In, amount, day)
                    } else {
                        expense(id, amount, day, "Salary")
                    }
                })
                .collect();
            sort_chronologically(&mut records);
            let opening = Money::new(opening);
            let rows = running_balance(opening, records).unwrap();

            for row in &rows {
                prop_assert_eq!(row.balance, row.previous_balance + row.amount);
            }
            for pair in rows.windows(2) {
                prop_assert_eq!(pair[1].previous_balance, pair[0].balance);
            }
            if let Some(first) = rows.first() {
                prop_assert_eq!(first.previous_balance, opening);
            }

            let totals = compute_totals(opening, &rows).unwrap();
            prop_assert_eq!(
                totals.final_balance,
                rows.last().map_or(opening, |row| row.balance)
            );
            prop_assert_eq!(totals.final_balance, opening + totals.total_movement);
        }
    }
}
