use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SharedError {
    #[error("Voter token must not be empty")]
    EmptyVoterToken,

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}
