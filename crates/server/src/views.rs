//! Conversions between engine values and wire types.

use api_types::{
    AccountKind as ApiAccountKind, RecordKind,
    account::AccountEntryView,
    fund::{FundDirection as ApiDirection, FundView},
    ledger::{LedgerFilter as ApiFilter, LedgerRowView, RecordView},
};
use chrono::NaiveDate;
use engine::{
    AccountKind, AccountTransaction, Domain, EntryKind, FundDirection, FundTransaction,
    LedgerFilter, LedgerRecord, LedgerRow, parse_transaction_date,
};

use crate::ServerError;

pub(crate) fn parse_domain(raw: &str) -> Result<Domain, ServerError> {
    Ok(raw.parse::<Domain>()?)
}

/// Parses a `YYYY-MM-DD` request date, attributing failures to `field`.
pub(crate) fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ServerError> {
    Ok(parse_transaction_date(field, raw)?)
}

pub(crate) fn parse_optional_date(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, ServerError> {
    raw.map(|raw| parse_date(field, raw)).transpose()
}

pub(crate) fn map_record_kind(kind: EntryKind) -> RecordKind {
    match kind {
        EntryKind::FundIn => RecordKind::FundIn,
        EntryKind::FundOut => RecordKind::FundOut,
        EntryKind::Income => RecordKind::Income,
        EntryKind::Expense => RecordKind::Expense,
    }
}

fn entry_kind(kind: RecordKind) -> EntryKind {
    match kind {
        RecordKind::FundIn => EntryKind::FundIn,
        RecordKind::FundOut => EntryKind::FundOut,
        RecordKind::Income => EntryKind::Income,
        RecordKind::Expense => EntryKind::Expense,
    }
}

pub(crate) fn account_kind(kind: ApiAccountKind) -> AccountKind {
    match kind {
        ApiAccountKind::Income => AccountKind::Income,
        ApiAccountKind::Expense => AccountKind::Expense,
    }
}

pub(crate) fn map_filter(filter: ApiFilter) -> Result<LedgerFilter, ServerError> {
    Ok(LedgerFilter {
        date_from: parse_optional_date("date_from", filter.date_from.as_deref())?,
        date_to: parse_optional_date("date_to", filter.date_to.as_deref())?,
        description: filter.description,
        category: filter.category,
        search: filter.search,
        kinds: filter
            .kinds
            .map(|kinds| kinds.into_iter().map(entry_kind).collect()),
    })
}

pub(crate) fn map_fund(tx: FundTransaction) -> FundView {
    FundView {
        id: tx.id,
        direction: match tx.direction {
            FundDirection::In => ApiDirection::In,
            FundDirection::Out => ApiDirection::Out,
        },
        amount_minor: tx.amount.minor(),
        purpose: tx.purpose,
        description: tx.description,
        transaction_date: tx.transaction_date,
        created_by: tx.created_by,
        created_at: tx.created_at,
    }
}

pub(crate) fn map_account(tx: AccountTransaction) -> AccountEntryView {
    AccountEntryView {
        id: tx.id,
        transaction_number: tx.transaction_number,
        kind: match tx.kind {
            AccountKind::Income => ApiAccountKind::Income,
            AccountKind::Expense => ApiAccountKind::Expense,
        },
        category: tx.category,
        category_id: tx.category_id,
        amount_minor: tx.amount.minor(),
        description: tx.description,
        transaction_date: tx.transaction_date,
        created_by: tx.created_by,
        created_at: tx.created_at,
    }
}

pub(crate) fn map_record(record: &LedgerRecord) -> RecordView {
    RecordView {
        id: record.id(),
        kind: map_record_kind(record.kind()),
        transaction_number: record.transaction_number().map(str::to_string),
        category: record.category().to_string(),
        description: record.description().map(str::to_string),
        amount_minor: record.amount().minor(),
        transaction_date: record.transaction_date(),
        created_by: record.created_by().to_string(),
    }
}

pub(crate) fn map_row(row: &LedgerRow) -> LedgerRowView {
    LedgerRowView {
        record: map_record(&row.record),
        previous_balance_minor: row.previous_balance.minor(),
        amount_minor: row.amount.minor(),
        balance_minor: row.balance.minor(),
    }
}
