/// Numeric conversion helpers.
///
/// Safe conversions between integer and floating-point types that return
/// `None` instead of silently truncating or wrapping. Used wherever the
/// value layer crosses between `i64`, `f64` and `usize`.
pub mod num;
