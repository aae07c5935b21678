pub mod inference;
pub mod observability;
pub mod storage;
