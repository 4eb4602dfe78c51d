//! Write endpoints: fund movements and operating account entries.

use api_types::{
    account::{AccountEntryNew, AccountEntryView},
    fund::{FundNew, FundView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{AccountCmd, FundCmd, Money};

use crate::{
    ServerError,
    server::{Actor, ServerState},
    views::{map_account, map_fund, parse_date, parse_domain},
};

fn fund_cmd(domain: &str, actor: Actor, payload: FundNew) -> Result<FundCmd, ServerError> {
    let mut cmd = FundCmd::new(
        parse_domain(domain)?,
        actor.0,
        Money::new(payload.amount_minor),
        payload.purpose,
        parse_date("transaction_date", &payload.transaction_date)?,
    );
    cmd.description = payload.description;
    Ok(cmd)
}

fn account_cmd(
    domain: &str,
    actor: Actor,
    payload: AccountEntryNew,
) -> Result<AccountCmd, ServerError> {
    let mut cmd = AccountCmd::new(
        parse_domain(domain)?,
        actor.0,
        Money::new(payload.amount_minor),
        parse_date("transaction_date", &payload.transaction_date)?,
    );
    cmd.category = payload.category;
    cmd.category_id = payload.category_id;
    cmd.description = payload.description;
    Ok(cmd)
}

pub async fn fund_in(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<FundNew>, ServerError>,
) -> Result<(StatusCode, Json<FundView>), ServerError> {
    let tx = state
        .engine
        .add_fund(fund_cmd(&domain, actor, payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(map_fund(tx))))
}

pub async fn fund_out(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<FundNew>, ServerError>,
) -> Result<(StatusCode, Json<FundView>), ServerError> {
    let tx = state
        .engine
        .withdraw_fund(fund_cmd(&domain, actor, payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(map_fund(tx))))
}

pub async fn expense_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountEntryNew>, ServerError>,
) -> Result<(StatusCode, Json<AccountEntryView>), ServerError> {
    let tx = state
        .engine
        .add_expense(account_cmd(&domain, actor, payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(map_account(tx))))
}

pub async fn income_new(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountEntryNew>, ServerError>,
) -> Result<(StatusCode, Json<AccountEntryView>), ServerError> {
    let tx = state
        .engine
        .add_income(account_cmd(&domain, actor, payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(map_account(tx))))
}
