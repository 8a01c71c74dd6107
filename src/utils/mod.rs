//! String, collection and formatting helpers.

pub mod debug;
pub mod error;
pub mod grouping;
pub mod similarity;
pub mod text;
pub mod timing;
pub mod truthy;

pub use error::UtilError;
pub use grouping::group_by;
pub use similarity::{
    DEFAULT_SIMILARITY_THRESHOLD, are_strs_similar, are_strs_similar_default, similarity_ratio,
};
pub use text::{first_or_err, none_to_str, remove_newlines, remove_special_chars, str_to_bool};
pub use timing::{format_duration, format_execution_time};
pub use truthy::{Truthy, is_falsy, is_truthy};
