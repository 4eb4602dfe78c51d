//! Report API endpoints

use api_types::report::{
    BalanceSheetQuery, BalanceSheetView, CategoryBreakdownResponse, CategoryQuery,
    CategorySort as ApiSort, CategoryTotalView, DailyTotalView, DailyTotalsResponse, MonthQuery,
    MonthTrendView, MonthlyReportView, TrendQuery, TrendResponse,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::CategorySort;

use crate::{
    ServerError,
    server::ServerState,
    views::{account_kind, parse_domain, parse_optional_date},
};

const DEFAULT_TREND_MONTHS: u32 = 6;

pub async fn monthly(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<MonthQuery>, ServerError>,
) -> Result<Json<MonthlyReportView>, ServerError> {
    let domain = parse_domain(&domain)?;
    let report = state
        .engine
        .monthly_report(domain, query.year, query.month)
        .await?;

    Ok(Json(MonthlyReportView {
        year: report.year,
        month: report.month,
        fund_in_minor: report.fund_in.minor(),
        fund_out_minor: report.fund_out.minor(),
        income_minor: report.income.minor(),
        expense_minor: report.expense.minor(),
        net_minor: report.net.minor(),
        opening_minor: report.opening.minor(),
        closing_minor: report.closing.minor(),
        count: report.count,
        profit_margin: report.profit_margin(),
    }))
}

pub async fn categories(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<CategoryQuery>, ServerError>,
) -> Result<Json<CategoryBreakdownResponse>, ServerError> {
    let domain = parse_domain(&domain)?;
    let sort = match query.sort.unwrap_or_default() {
        ApiSort::Name => CategorySort::ByName,
        ApiSort::Amount => CategorySort::ByAmountDesc,
    };
    let categories = state
        .engine
        .category_breakdown(domain, query.year, query.month, account_kind(query.kind), sort)
        .await?
        .into_iter()
        .map(|total| CategoryTotalView {
            label: total.label,
            total_minor: total.total.minor(),
            count: total.count,
        })
        .collect();

    Ok(Json(CategoryBreakdownResponse { categories }))
}

pub async fn trend(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<TrendQuery>, ServerError>,
) -> Result<Json<TrendResponse>, ServerError> {
    let domain = parse_domain(&domain)?;
    let as_of = parse_optional_date("as_of", query.as_of.as_deref())?
        .unwrap_or_else(|| Utc::now().date_naive());
    let months = state
        .engine
        .trend(domain, as_of, query.months.unwrap_or(DEFAULT_TREND_MONTHS))
        .await?
        .into_iter()
        .map(|month| MonthTrendView {
            year: month.year,
            month: month.month,
            income_minor: month.income.minor(),
            expense_minor: month.expense.minor(),
        })
        .collect();

    Ok(Json(TrendResponse { months }))
}

pub async fn daily(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<MonthQuery>, ServerError>,
) -> Result<Json<DailyTotalsResponse>, ServerError> {
    let domain = parse_domain(&domain)?;
    let days = state
        .engine
        .daily_totals(domain, query.year, query.month)
        .await?
        .into_iter()
        .map(|day| DailyTotalView {
            date: day.date,
            inflow_minor: day.inflow.minor(),
            outflow_minor: day.outflow.minor(),
        })
        .collect();

    Ok(Json(DailyTotalsResponse { days }))
}

pub async fn balance_sheet(
    State(state): State<ServerState>,
    Path(domain): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<BalanceSheetQuery>, ServerError>,
) -> Result<Json<BalanceSheetView>, ServerError> {
    let domain = parse_domain(&domain)?;
    let as_of = parse_optional_date("as_of", query.as_of.as_deref())?;
    let sheet = state.engine.balance_sheet(domain, as_of).await?;

    Ok(Json(BalanceSheetView {
        as_of: sheet.as_of,
        fund_in_minor: sheet.fund_in.minor(),
        fund_out_minor: sheet.fund_out.minor(),
        income_minor: sheet.income.minor(),
        expense_minor: sheet.expense.minor(),
        balance_minor: sheet.balance.minor(),
    }))
}
