//! Types that represent the import data model, such as `Row` and `Buckets`.
mod amount;
mod buckets;
mod category;
mod date;
mod row;

pub use amount::{Amount, AmountError};
pub use buckets::Buckets;
pub use category::Bucket;
pub use date::DateFormatError;
pub use row::Row;
