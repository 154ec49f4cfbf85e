use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("The workbook has no sheet with a header row")]
    EmptyWorkbook,

    #[error("Missing required columns in the file: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}
