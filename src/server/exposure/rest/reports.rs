//! Sales report download

use crate::core::error::ServiceResult;
use crate::core::report::XLSX_CONTENT_TYPE;
use crate::server::host::ServerHost;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub date: Option<String>,
    pub restaurant_id: Option<String>,
}

/// `GET /api/reports/orders?date=YYYY-MM-DD&restaurantId=mcd`
///
/// Returns the xlsx workbook as an attachment; errors still use the JSON envelope.
pub async fn order_report(
    State(host): State<Arc<ServerHost>>,
    Query(params): Query<ReportParams>,
) -> ServiceResult<Response> {
    let report = host
        .reports
        .generate(params.date.as_deref(), params.restaurant_id.as_deref())
        .await?;
    let body = report.to_xlsx()?;
    let disposition = format!("attachment; filename={}", report.filename());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
