//! Running-balance ledger engine for the hospital fund domains.
//!
//! Each [`Domain`] owns an append-only log of fund movements and operating
//! account transactions. Balances and reports are always derived from that
//! log; nothing is cached between requests.

pub use categories::ExpenseCategory;
pub use commands::{AccountCmd, FundCmd};
pub use domain::Domain;
pub use error::EngineError;
pub use ledger::{
    LedgerFilter, LedgerPage, LedgerQuery, LedgerRow, LedgerTotals, MAX_PAGE_SIZE,
    compute_totals, paginate, running_balance, sort_chronologically,
};
pub use money::Money;
pub use ops::{DEFAULT_LOCK_TIMEOUT, Engine, EngineBuilder, RecordPage};
pub use records::{
    AccountKind, AccountTransaction, EntryKind, FundDirection, FundTransaction, LedgerRecord,
};
pub use reports::{
    BalanceSheet, CategorySort, CategoryTotal, DailyTotal, MonthTrend, MonthlyReport,
    profit_margin,
};
pub use util::parse_transaction_date;

mod categories;
mod commands;
mod domain;
mod error;
mod ledger;
mod money;
mod ops;
mod records;
mod reports;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
