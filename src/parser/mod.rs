pub mod investing;
pub(crate) mod scan;

pub use investing::{InvestingParser, Parser};
