use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bike lane dataset produced no segments")]
    EmptyDataset,
    #[error("No nearby points found for snapping")]
    NoPointsFound,
    #[error("Invalid node index")]
    InvalidNodeIndex,
    #[error("Malformed route query: {0}")]
    MalformedQuery(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
