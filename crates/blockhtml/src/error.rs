#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Block tree is {depth} levels deep, the limit is {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("Conversion produced {0} diagnostic(s) in strict mode")]
    StrictDiagnostics(usize),
}
