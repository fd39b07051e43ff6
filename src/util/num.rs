/// Safely converts an `f64` to `i64`, returning `None` for non-finite or
/// out-of-range values.
///
/// # Example
/// ```
/// use exprima::util::num::f64_to_i64_checked;
///
/// assert_eq!(f64_to_i64_checked(1000.0), Some(1000));
/// assert_eq!(f64_to_i64_checked(f64::NAN), None);
/// assert_eq!(f64_to_i64_checked(1e20), None);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn f64_to_i64_checked(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }

    if value < i64::MIN as f64 || value > i64::MAX as f64 {
        return None;
    }

    Some(value as i64)
}

/// Safely converts an `i64` to a `usize`, returning `None` for negative
/// values or values exceeding the platform's address range.
///
/// # Example
/// ```
/// use exprima::util::num::i64_to_usize_checked;
///
/// assert_eq!(i64_to_usize_checked(42), Some(42));
/// assert_eq!(i64_to_usize_checked(-1), None);
/// ```
#[must_use]
pub fn i64_to_usize_checked(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}
