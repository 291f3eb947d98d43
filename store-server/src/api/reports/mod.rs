//! Sales report API
//!
//! `GET /api/admin/reports/sales?report_type=daily|weekly|monthly|custom&start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::reports::{SalesRange, SalesReport, sales_report};
use crate::utils::{ApiResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/admin/reports/sales", get(sales))
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    #[serde(default = "default_report_type")]
    pub report_type: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

fn default_report_type() -> String {
    "daily".to_string()
}

async fn sales(
    State(state): State<ServerState>,
    _admin: CurrentAdmin,
    Query(query): Query<SalesQuery>,
) -> ApiResult<SalesReport> {
    let range = SalesRange::parse(
        &query.report_type,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?;
    let orders = state.storage().get_all_orders()?;
    let report = sales_report(&orders, range.bounds(Utc::now()));

    tracing::debug!(
        report_type = %query.report_type,
        orders = report.summary.order_count,
        "Sales report generated"
    );
    Ok(ok(report))
}
