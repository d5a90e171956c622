//! Daily sales report
//!
//! Folds the paid orders of one calendar day into units sold per item and
//! exports the result as an xlsx workbook.

use crate::core::calendar::{parse_date, Calendar, DayWindow};
use crate::core::error::{ServiceError, ServiceResult, ValidationError};
use crate::core::order::{Order, OrderStatus};
use crate::core::service::{Catalog, OrderQuery, OrderStore};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADER: [&str; 3] = ["date", "item_name", "number"];

/// Failures while serializing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("report has {0} rows, more than a worksheet holds")]
    TooManyRows(usize),
}

impl From<ReportError> for ServiceError {
    fn from(err: ReportError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// One line of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub date: String,
    pub item_name: String,
    pub number: u64,
}

/// Units sold per item on one day
#[derive(Debug, Clone)]
pub struct SalesReport {
    pub window: DayWindow,
    pub restaurant_id: Option<String>,
    /// Ascending by item id
    pub rows: Vec<ReportRow>,
}

impl SalesReport {
    /// Download name, e.g. `orders_2024-11-02.xlsx`
    pub fn filename(&self) -> String {
        format!("orders_{}.xlsx", self.window)
    }

    /// One `orders` sheet with a `date | item_name | number` header row
    pub fn to_xlsx(&self) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("orders")?;

        for (col, title) in (0u16..).zip(HEADER) {
            sheet.write_string(0, col, title)?;
        }
        for (index, row) in self.rows.iter().enumerate() {
            let line = u32::try_from(index + 1)
                .map_err(|_| ReportError::TooManyRows(self.rows.len()))?;
            sheet.write_string(line, 0, &row.date)?;
            sheet.write_string(line, 1, &row.item_name)?;
            sheet.write_number(line, 2, row.number as f64)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// Builds [`SalesReport`]s from the order store and catalog
pub struct ReportAggregator {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn OrderStore>,
    calendar: Calendar,
    include_fulfilled: bool,
}

impl ReportAggregator {
    pub fn new(catalog: Arc<dyn Catalog>, store: Arc<dyn OrderStore>, calendar: Calendar) -> Self {
        Self {
            catalog,
            store,
            calendar,
            include_fulfilled: false,
        }
    }

    /// Also count orders that moved on to PREPARING, READY or COMPLETED
    pub fn include_fulfilled(mut self, include: bool) -> Self {
        self.include_fulfilled = include;
        self
    }

    fn statuses(&self) -> Vec<OrderStatus> {
        if self.include_fulfilled {
            OrderStatus::ALL
                .into_iter()
                .filter(|status| status.has_progressed_past_payment())
                .collect()
        } else {
            vec![OrderStatus::Paid]
        }
    }

    pub async fn generate(
        &self,
        date: Option<&str>,
        restaurant_id: Option<&str>,
    ) -> ServiceResult<SalesReport> {
        let date = date
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ValidationError::MissingArgument {
                argument: "date".to_string(),
            })?;
        let window = self.calendar.window_for(parse_date(date)?);
        let restaurant_id = restaurant_id.filter(|r| !r.is_empty());

        let query = OrderQuery::paid_within(window).with_statuses(self.statuses());
        let orders = self.store.find(&query).await?;
        let units = units_per_item(&orders);

        let mut rows = Vec::with_capacity(units.len());
        for (item_id, number) in units {
            let item = self.catalog.find_item(&item_id).await?;
            let item_name = match (restaurant_id, item) {
                (Some(rid), Some(item)) if item.restaurant_id == rid => item.name,
                (Some(_), _) => continue,
                (None, Some(item)) => item.name,
                (None, None) => item_id,
            };
            rows.push(ReportRow {
                date: window.to_string(),
                item_name,
                number,
            });
        }

        tracing::info!(
            day = %window,
            restaurant_id = restaurant_id.unwrap_or("*"),
            orders = orders.len(),
            rows = rows.len(),
            "sales report generated"
        );
        Ok(SalesReport {
            window,
            restaurant_id: restaurant_id.map(str::to_string),
            rows,
        })
    }
}

fn units_per_item(orders: &[Order]) -> BTreeMap<String, u64> {
    let mut units = BTreeMap::new();
    for item in orders.iter().flat_map(|order| &order.items) {
        *units.entry(item.item_id.clone()).or_insert(0) += u64::from(item.quantity);
    }
    units
}
