use base64::Engine as _;
use chrono::NaiveDate;
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    Domain, EngineError, LedgerFilter, LedgerPage, LedgerQuery, LedgerRecord, MAX_PAGE_SIZE,
    Money, ResultEngine, compute_totals, paginate, records, running_balance,
};

use super::{Engine, balances::Window, with_tx};

/// A newest-first slice of a domain's records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPage {
    pub records: Vec<LedgerRecord>,
    /// Opaque token for the following slice, `None` on the last one.
    pub next_cursor: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RecordsCursor {
    transaction_date: NaiveDate,
    id: i64,
    snapshot: i64,
}

impl RecordsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("cannot encode records cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("malformed records cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("malformed records cursor".to_string()))
    }
}

impl Engine {
    /// Running-balance view of a domain.
    ///
    /// Rows are folded oldest first starting from the balance of every
    /// record dated before `date_from` (zero without `date_from`), then
    /// returned newest first and paginated. Rows dropped by the text or kind
    /// predicates do not move the running balance.
    ///
    /// The first request pins a snapshot (the highest record id visible);
    /// passing it back keeps later pages stable while writes continue.
    pub async fn ledger(&self, domain: Domain, query: &LedgerQuery) -> ResultEngine<LedgerPage> {
        let filter = &query.filter;
        filter.validate()?;
        // Rejects a bad page before touching the store.
        paginate::<()>(&[], query.page, query.page_size)?;

        with_tx!(self, |db_tx| {
            let snapshot = match query.snapshot {
                Some(snapshot) => snapshot,
                None => Self::latest_id(&db_tx, domain).await?,
            };
            let opening = match filter.date_from {
                Some(from) => Self::opening_balance(&db_tx, domain, from, Some(snapshot)).await?,
                None => Money::ZERO,
            };
            let window = Window {
                from: filter.date_from,
                to: filter.date_to,
                snapshot: Some(snapshot),
            };
            let records = Self::load_records(&db_tx, domain, window).await?;

            let mut rows = running_balance(
                opening,
                records.into_iter().filter(|record| filter.matches(record)),
            )?;
            let totals = compute_totals(opening, &rows)?;
            rows.reverse();

            let total_rows = rows.len() as u64;
            let page_rows = paginate(&rows, query.page, query.page_size)?.to_vec();
            tracing::debug!(
                %domain,
                snapshot,
                total_rows,
                page = query.page,
                "rendered ledger page"
            );

            Ok(LedgerPage {
                rows: page_rows,
                totals,
                page: query.page,
                page_size: query.page_size,
                total_rows,
                snapshot,
            })
        })
    }

    /// Lists the records of a domain newest first, ordered by
    /// `(transaction_date, id)` descending, with cursor-based pagination.
    ///
    /// The cursor pins the snapshot of the first call, so records committed
    /// while paging never shift or duplicate entries.
    pub async fn list_records(
        &self,
        domain: Domain,
        filter: &LedgerFilter,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<RecordPage> {
        filter.validate()?;
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(EngineError::validation(
                "limit",
                format!("limit must be in 1..={MAX_PAGE_SIZE}"),
            ));
        }
        let cursor = cursor.map(RecordsCursor::decode).transpose()?;

        with_tx!(self, |db_tx| {
            let snapshot = match &cursor {
                Some(cursor) => cursor.snapshot,
                None => Self::latest_id(&db_tx, domain).await?,
            };
            let candidates =
                Self::records_before(&db_tx, domain, filter, snapshot, cursor.as_ref()).await?;

            let mut matching = candidates.into_iter().filter(|record| filter.matches(record));
            let records: Vec<LedgerRecord> = matching.by_ref().take(limit as usize).collect();
            let has_more = matching.next().is_some();

            let next_cursor = if has_more {
                records
                    .last()
                    .map(|record| RecordsCursor {
                        transaction_date: record.transaction_date(),
                        id: record.id(),
                        snapshot,
                    })
                    .map(|cursor| cursor.encode())
                    .transpose()?
            } else {
                None
            };

            Ok(RecordPage {
                records,
                next_cursor,
            })
        })
    }

    /// Records strictly after `cursor` in newest-first order, bounded by the
    /// snapshot and the filter's date and kind predicates.
    async fn records_before(
        db_tx: &DatabaseTransaction,
        domain: Domain,
        filter: &LedgerFilter,
        snapshot: i64,
        cursor: Option<&RecordsCursor>,
    ) -> ResultEngine<Vec<LedgerRecord>> {
        let mut query = records::Entity::find()
            .filter(records::Column::Domain.eq(domain.as_str()))
            .filter(records::Column::Id.lte(snapshot))
            .order_by_desc(records::Column::TransactionDate)
            .order_by_desc(records::Column::Id);

        if let Some(from) = filter.date_from {
            query = query.filter(records::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(records::Column::TransactionDate.lte(to));
        }
        if let Some(kinds) = &filter.kinds {
            query = query.filter(records::Column::Kind.is_in(kinds.iter().map(|k| k.as_str())));
        }
        if let Some(cursor) = cursor {
            query = query.filter(
                Condition::any()
                    .add(records::Column::TransactionDate.lt(cursor.transaction_date))
                    .add(
                        Condition::all()
                            .add(records::Column::TransactionDate.eq(cursor.transaction_date))
                            .add(records::Column::Id.lt(cursor.id)),
                    ),
            );
        }

        let models = query.all(db_tx).await?;
        models.into_iter().map(LedgerRecord::try_from).collect()
    }
}
