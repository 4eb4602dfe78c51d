//! Ledger view and transaction list endpoints

use api_types::ledger::{
    LedgerRequest, LedgerResponse, TransactionList, TransactionListResponse,
};
use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use engine::LedgerQuery;

use crate::{
    ServerError,
    server::ServerState,
    views::{map_filter, map_record, map_row, parse_domain},
};

pub async fn ledger(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<LedgerRequest>, ServerError>,
) -> Result<Json<LedgerResponse>, ServerError> {
    let domain = parse_domain(&domain)?;
    let defaults = LedgerQuery::default();
    let query = LedgerQuery {
        filter: map_filter(payload.filter)?,
        page: payload.page.unwrap_or(defaults.page),
        page_size: payload.page_size.unwrap_or(defaults.page_size),
        snapshot: payload.snapshot,
    };

    let page = state.engine.ledger(domain, &query).await?;

    Ok(Json(LedgerResponse {
        rows: page.rows.iter().map(map_row).collect(),
        opening_minor: page.totals.opening.minor(),
        total_movement_minor: page.totals.total_movement.minor(),
        final_balance_minor: page.totals.final_balance.minor(),
        page: page.page,
        page_size: page.page_size,
        total_rows: page.total_rows,
        snapshot: page.snapshot,
    }))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionList>, ServerError>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let domain = parse_domain(&domain)?;
    let limit = payload.limit.unwrap_or(50);
    let filter = map_filter(payload.filter)?;

    let page = state
        .engine
        .list_records(domain, &filter, limit, payload.cursor.as_deref())
        .await?;

    Ok(Json(TransactionListResponse {
        records: page.records.iter().map(map_record).collect(),
        next_cursor: page.next_cursor,
    }))
}
