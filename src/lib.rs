//! paramset: lazy Cartesian parameter-set combinators for test matrices.
//!
//! Build axes with [`options`], [`bools`] or literal [`records`], cross them
//! with [`combine`], prune with [`filter`], [`exclude`] or [`only`], then
//! iterate. Sets are restartable descriptions; the product is computed one
//! record at a time and a key shared by two combined axes is an error.
//!
//! ```rust
//! use paramset::{bools, combine, exclude, options, params};
//!
//! let set = exclude(
//!     combine([options("format", ["r8", "rgba8"]), bools("mapped")]),
//!     [params! { "format" => "r8", "mapped" => true }],
//! );
//! let ids: Vec<String> = set.iter().map(|r| r.unwrap().to_query()).collect();
//! assert_eq!(
//!     ids,
//!     [
//!         "format=\"r8\";mapped=false",
//!         "format=\"rgba8\";mapped=false",
//!         "format=\"rgba8\";mapped=true",
//!     ]
//! );
//! ```

pub use crate::cases::{CaseQuery, Catalog, TestCase};
pub use crate::errors::ParamError;
pub use crate::matrix::{MatrixFile, SetDef};
pub use crate::params::{
    bools, combine, exclude, filter, only, options, records, unit, Cases, ParamSet,
};
pub use crate::record::ParamRecord;
pub use crate::value::Value;

pub mod cases;
pub mod cli;
pub mod discovery;
pub mod errors;
pub mod matrix;
pub mod params;
pub mod record;
pub mod value;
