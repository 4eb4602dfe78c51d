//! Balance API endpoint

use api_types::balance::BalanceView;
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState, views::parse_domain};

/// Current balance of a domain, from every committed record.
pub async fn get(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
) -> Result<Json<BalanceView>, ServerError> {
    let domain = parse_domain(&domain)?;
    let balance = state.engine.balance(domain).await?;

    Ok(Json(BalanceView {
        domain: domain.to_string(),
        balance_minor: balance.minor(),
    }))
}
