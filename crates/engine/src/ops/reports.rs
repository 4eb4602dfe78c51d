use chrono::NaiveDate;
use sea_orm::TransactionTrait;

use crate::{
    AccountKind, BalanceSheet, CategorySort, CategoryTotal, DailyTotal, Domain, MonthTrend,
    MonthlyReport, ResultEngine, reports,
    util::{month_bounds, months_ending_at},
};

use super::{Engine, balances::Window, with_tx};

impl Engine {
    /// Per-kind totals of one calendar month, with the balance carried into
    /// and out of it.
    pub async fn monthly_report(
        &self,
        domain: Domain,
        year: i32,
        month: u32,
    ) -> ResultEngine<MonthlyReport> {
        let (first, last) = month_bounds(year, month)?;
        with_tx!(self, |db_tx| {
            let opening = Self::opening_balance(&db_tx, domain, first, None).await?;
            let records = Self::load_records(&db_tx, domain, Window::between(first, last)).await?;
            reports::monthly_report(year, month, opening, &records)
        })
    }

    /// Totals of one month's income or expense records grouped by category.
    pub async fn category_breakdown(
        &self,
        domain: Domain,
        year: i32,
        month: u32,
        kind: AccountKind,
        sort: CategorySort,
    ) -> ResultEngine<Vec<CategoryTotal>> {
        let (first, last) = month_bounds(year, month)?;
        with_tx!(self, |db_tx| {
            let records = Self::load_records(&db_tx, domain, Window::between(first, last)).await?;
            reports::category_breakdown(&records, kind, sort)
        })
    }

    /// Income and expense of the `window_months` months ending with the
    /// month of `as_of`, oldest first. Months without records are present
    /// with zero totals.
    pub async fn trend(
        &self,
        domain: Domain,
        as_of: NaiveDate,
        window_months: u32,
    ) -> ResultEngine<Vec<MonthTrend>> {
        let months = months_ending_at(as_of, window_months)?;
        let (Some(&(first_year, first_month)), Some(&(last_year, last_month))) =
            (months.first(), months.last())
        else {
            return Ok(Vec::new());
        };
        let (first, _) = month_bounds(first_year, first_month)?;
        let (_, last) = month_bounds(last_year, last_month)?;
        with_tx!(self, |db_tx| {
            let records = Self::load_records(&db_tx, domain, Window::between(first, last)).await?;
            reports::trend(&months, &records)
        })
    }

    /// Inflow and outflow of every day of a month.
    pub async fn daily_totals(
        &self,
        domain: Domain,
        year: i32,
        month: u32,
    ) -> ResultEngine<Vec<DailyTotal>> {
        let (first, last) = month_bounds(year, month)?;
        with_tx!(self, |db_tx| {
            let records = Self::load_records(&db_tx, domain, Window::between(first, last)).await?;
            reports::daily_totals(year, month, &records)
        })
    }

    /// Per-kind totals of every record dated on or before `as_of`, or of
    /// the whole domain when `as_of` is `None`.
    pub async fn balance_sheet(
        &self,
        domain: Domain,
        as_of: Option<NaiveDate>,
    ) -> ResultEngine<BalanceSheet> {
        let window = as_of.map_or_else(Window::default, Window::until);
        with_tx!(self, |db_tx| {
            let records = Self::load_records(&db_tx, domain, window).await?;
            reports::balance_sheet(as_of, &records)
        })
    }
}
