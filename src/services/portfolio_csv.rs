use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::error::ApiError;
use crate::models::{Investment, NewInvestment};

pub const EXPORT_HEADER: [&str; 5] = ["symbol", "category", "quantity", "buy_price", "purchase_date"];
pub const DEFAULT_CATEGORY: &str = "Other";

/// Holdings parsed from an uploaded file, plus how many rows were dropped.
#[derive(Debug, Default, PartialEq)]
pub struct ImportPlan {
    pub rows: Vec<NewInvestment>,
    pub skipped: usize,
}

pub fn export_csv(holdings: &[Investment]) -> Result<String, ApiError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER).map_err(csv_failure)?;

    for h in holdings {
        writer
            .write_record([
                h.symbol.clone(),
                h.category.clone(),
                h.quantity.to_string(),
                h.buy_price.to_string(),
                h.purchase_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])
            .map_err(csv_failure)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("Failed to flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(format!("CSV is not UTF-8: {e}")))
}

fn csv_failure(e: csv::Error) -> ApiError {
    ApiError::Internal(format!("Failed to write CSV: {e}"))
}

/// Column positions resolved from the header row.
struct Columns {
    symbol: Option<usize>,
    category: Option<usize>,
    quantity: Option<usize>,
    buy_price: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let find = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        Self {
            symbol: find("symbol"),
            category: find("category"),
            quantity: find("quantity"),
            buy_price: find("buy_price"),
        }
    }
}

fn cell<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
    column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn number(record: &StringRecord, column: Option<usize>, name: &str, line: u64) -> Result<f64, ApiError> {
    match cell(record, column) {
        None => Ok(0.0),
        Some(raw) => raw.parse::<f64>().map_err(|_| {
            ApiError::Validation(format!(
                "Error importing CSV: invalid {name} '{raw}' on line {line}"
            ))
        }),
    }
}

/// Parses an uploaded portfolio file.
///
/// Rows without a symbol, or with a quantity or price that is not strictly
/// positive, are skipped. A value that is not a number at all rejects the
/// whole file.
pub fn parse_import(content: &[u8]) -> Result<ImportPlan, ApiError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content);

    let header = reader
        .headers()
        .map_err(|e| ApiError::Validation(format!("Error importing CSV: {e}")))?
        .clone();
    let columns = Columns::from_header(&header);

    let mut plan = ImportPlan::default();
    for (i, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| ApiError::Validation(format!("Error importing CSV: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 2);

        let Some(symbol) = cell(&record, columns.symbol) else {
            plan.skipped += 1;
            continue;
        };

        let quantity = number(&record, columns.quantity, "quantity", line)?;
        let buy_price = number(&record, columns.buy_price, "buy_price", line)?;
        if !(quantity > 0.0 && buy_price > 0.0) || !quantity.is_finite() || !buy_price.is_finite() {
            plan.skipped += 1;
            continue;
        }

        plan.rows.push(NewInvestment {
            symbol: symbol.to_uppercase(),
            category: cell(&record, columns.category)
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string(),
            quantity,
            buy_price,
        });
    }

    Ok(plan)
}
