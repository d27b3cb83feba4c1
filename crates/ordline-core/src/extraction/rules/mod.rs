//! Rule-based line classifiers for order-summary documents.

pub mod amounts;
pub mod classify;
pub mod dimensions;
pub mod patterns;

pub use amounts::{parse_amount, parse_money};
pub use classify::{
    classify, contains_currency, fold_label, is_bare_total, is_header_token, is_integer_line,
    is_money_line, is_noise, is_totals_start, parse_quantity, LineClass,
};
pub use dimensions::{
    is_dimension_line, is_dimension_token, is_measurement_token, is_unit_token, strip_dimensions,
    unify_multiplication,
};
