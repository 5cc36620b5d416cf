use arcoach_core::PipelineSource;

use crate::client::{quote_sheet_name, SheetsClient};
use crate::error::SheetsError;

/// Reads the whole pipeline sheet, title and header rows included.
#[derive(Debug, Clone)]
pub struct SheetPipelineSource {
    client: SheetsClient,
    sheet: String,
}

impl SheetPipelineSource {
    #[must_use]
    pub fn new(client: SheetsClient, sheet: impl Into<String>) -> Self {
        Self {
            client,
            sheet: sheet.into(),
        }
    }
}

impl PipelineSource for SheetPipelineSource {
    type Error = SheetsError;

    async fn read_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let rows = self.client.get_values(&quote_sheet_name(&self.sheet)).await?;
        tracing::info!(sheet = %self.sheet, rows = rows.len(), "read pipeline sheet");
        Ok(rows)
    }
}
