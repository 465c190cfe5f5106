pub mod database_validator;
pub mod documents;
pub mod numbering;
