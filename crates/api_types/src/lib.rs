use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Input field the error belongs to, when there is one.
    pub field: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    FundIn,
    FundOut,
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Income,
    Expense,
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub domain: String,
        pub balance_minor: i64,
    }
}

pub mod fund {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum FundDirection {
        In,
        Out,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundNew {
        /// Must be > 0.
        pub amount_minor: i64,
        pub purpose: String,
        pub description: Option<String>,
        /// `YYYY-MM-DD`. May be in the past.
        pub transaction_date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundView {
        pub id: i64,
        pub direction: FundDirection,
        pub amount_minor: i64,
        pub purpose: String,
        pub description: Option<String>,
        pub transaction_date: NaiveDate,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod account {
    use super::*;

    /// Expense or income entry. At least one of `category` and
    /// `category_id` is required; the id wins when both are present.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountEntryNew {
        pub amount_minor: i64,
        pub category: Option<String>,
        pub category_id: Option<i64>,
        pub description: Option<String>,
        /// `YYYY-MM-DD`. May be in the past.
        pub transaction_date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountEntryView {
        pub id: i64,
        pub transaction_number: String,
        pub kind: AccountKind,
        pub category: String,
        pub category_id: Option<i64>,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub transaction_date: NaiveDate,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LedgerFilter {
        /// `YYYY-MM-DD`, inclusive.
        pub date_from: Option<String>,
        /// `YYYY-MM-DD`, inclusive.
        pub date_to: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        /// Matches transaction number, description or category.
        pub search: Option<String>,
        pub kinds: Option<Vec<RecordKind>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LedgerRequest {
        #[serde(flatten)]
        pub filter: LedgerFilter,
        /// 1-based, defaults to 1.
        pub page: Option<u64>,
        pub page_size: Option<u64>,
        /// `snapshot` of a previous response, to page through the same view.
        pub snapshot: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordView {
        pub id: i64,
        pub kind: RecordKind,
        pub transaction_number: Option<String>,
        /// Category label, or purpose for fund movements.
        pub category: String,
        pub description: Option<String>,
        /// Always positive; `kind` gives the direction.
        pub amount_minor: i64,
        pub transaction_date: NaiveDate,
        pub created_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerRowView {
        pub record: RecordView,
        pub previous_balance_minor: i64,
        /// Signed movement.
        pub amount_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerResponse {
        /// Newest first.
        pub rows: Vec<LedgerRowView>,
        pub opening_minor: i64,
        pub total_movement_minor: i64,
        pub final_balance_minor: i64,
        pub page: u64,
        pub page_size: u64,
        pub total_rows: u64,
        pub snapshot: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        #[serde(flatten)]
        pub filter: LedgerFilter,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub records: Vec<RecordView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthQuery {
        pub year: i32,
        pub month: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyReportView {
        pub year: i32,
        pub month: u32,
        pub fund_in_minor: i64,
        pub fund_out_minor: i64,
        pub income_minor: i64,
        pub expense_minor: i64,
        pub net_minor: i64,
        pub opening_minor: i64,
        pub closing_minor: i64,
        pub count: u64,
        /// Percent; `0` without income.
        pub profit_margin: f64,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategorySort {
        #[default]
        Name,
        Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryQuery {
        pub year: i32,
        pub month: u32,
        pub kind: AccountKind,
        pub sort: Option<CategorySort>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotalView {
        pub label: String,
        pub total_minor: i64,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryBreakdownResponse {
        pub categories: Vec<CategoryTotalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendQuery {
        /// Defaults to 6.
        pub months: Option<u32>,
        /// `YYYY-MM-DD`, defaults to the current UTC date.
        pub as_of: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthTrendView {
        pub year: i32,
        pub month: u32,
        pub income_minor: i64,
        pub expense_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendResponse {
        pub months: Vec<MonthTrendView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyTotalView {
        pub date: NaiveDate,
        pub inflow_minor: i64,
        pub outflow_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyTotalsResponse {
        pub days: Vec<DailyTotalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceSheetQuery {
        /// `YYYY-MM-DD`.
        pub as_of: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceSheetView {
        pub as_of: Option<NaiveDate>,
        pub fund_in_minor: i64,
        pub fund_out_minor: i64,
        pub income_minor: i64,
        pub expense_minor: i64,
        pub balance_minor: i64,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryList {
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub name: String,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryActive {
        pub active: bool,
    }
}
