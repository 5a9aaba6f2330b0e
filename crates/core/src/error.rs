#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid block JSON: {0}")]
    Json(#[from] serde_json::Error),
}
