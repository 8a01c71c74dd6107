use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UtilError {
    #[error("The input list is empty.")]
    EmptyList,
    #[error("Invalid input: {0}. Expected 'True' or 'False'.")]
    InvalidBool(String),
}
