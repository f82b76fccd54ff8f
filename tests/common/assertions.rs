//! Logged assertion helpers for pagegrid tests.
//!
//! These functions wrap standard assertions with tracing logs,
//! providing detailed context when assertions fail.

#![allow(dead_code)]

use std::fmt::Debug;

/// Assert equality with detailed logging.
///
/// ```rust,ignore
/// assert_eq_logged("page count", pages.len(), 5);
/// ```
#[track_caller]
pub fn assert_eq_logged<T: PartialEq + Debug>(context: &str, actual: T, expected: T) {
    tracing::debug!(
        context = context,
        expected = ?expected,
        actual = ?actual,
        "asserting equality"
    );

    if actual != expected {
        tracing::error!(
            context = context,
            expected = ?expected,
            actual = ?actual,
            "assertion failed: values not equal"
        );
    }

    assert_eq!(
        actual, expected,
        "{context}: expected {expected:?}, got {actual:?}"
    );

    tracing::trace!(context = context, "assertion passed");
}

/// Assert that a value is true with logging.
#[track_caller]
pub fn assert_true_logged(context: &str, value: bool) {
    tracing::debug!(context = context, value = value, "asserting true");

    if !value {
        tracing::error!(
            context = context,
            value = value,
            "assertion failed: expected true"
        );
    }

    assert!(value, "{context}: expected true, got false");

    tracing::trace!(context = context, "assertion passed");
}

/// Assert that a Result is Ok with logging. Returns the Ok value.
///
/// ```rust,ignore
/// let pages = assert_ok_logged("layout", document.layout());
/// ```
#[track_caller]
pub fn assert_ok_logged<T: Debug, E: Debug>(context: &str, result: Result<T, E>) -> T {
    match result {
        Ok(value) => {
            tracing::trace!(context = context, "assertion passed: got Ok");
            value
        }
        Err(ref e) => {
            tracing::error!(context = context, error = ?e, "assertion failed: expected Ok, got Err");
            panic!("{context}: expected Ok, got Err({e:?})");
        }
    }
}

/// Assert that a Result is Err with logging. Returns the error.
#[track_caller]
pub fn assert_err_logged<T: Debug, E: Debug>(context: &str, result: Result<T, E>) -> E {
    match result {
        Err(e) => {
            tracing::trace!(context = context, error = ?e, "assertion passed: got Err");
            e
        }
        Ok(ref value) => {
            tracing::error!(context = context, value = ?value, "assertion failed: expected Err, got Ok");
            panic!("{context}: expected Err, got Ok({value:?})");
        }
    }
}

/// Assert two lengths in points agree within `epsilon`.
///
/// ```rust,ignore
/// assert_approx_eq_logged("fragment height", fragment.height(), 100.0, 1e-3);
/// ```
#[track_caller]
pub fn assert_approx_eq_logged(context: &str, actual: f32, expected: f32, epsilon: f32) {
    tracing::debug!(
        context = context,
        expected = expected,
        actual = actual,
        epsilon = epsilon,
        "asserting approximate equality"
    );

    let diff = (actual - expected).abs();
    if diff > epsilon {
        tracing::error!(
            context = context,
            expected = expected,
            actual = actual,
            diff = diff,
            "assertion failed: values not approximately equal"
        );
        panic!("{context}: expected {expected} (within {epsilon}), got {actual} (diff: {diff})");
    }

    tracing::trace!(context = context, "assertion passed");
}

/// Assert that `used` points fit into `capacity` points.
#[track_caller]
pub fn assert_fits_logged(context: &str, used: f32, capacity: f32) {
    tracing::debug!(
        context = context,
        used = used,
        capacity = capacity,
        "asserting fit"
    );

    if used > capacity + 1e-3 {
        tracing::error!(
            context = context,
            used = used,
            capacity = capacity,
            "assertion failed: content overflows"
        );
        panic!("{context}: {used}pt does not fit into {capacity}pt");
    }
}

/// Assert that a slice has a specific length with logging.
#[track_caller]
pub fn assert_len_logged<T>(context: &str, slice: &[T], expected_len: usize) {
    let actual_len = slice.len();
    tracing::debug!(
        context = context,
        expected_len = expected_len,
        actual_len = actual_len,
        "asserting length"
    );

    if actual_len != expected_len {
        tracing::error!(
            context = context,
            expected_len = expected_len,
            actual_len = actual_len,
            "assertion failed: unexpected length"
        );
        panic!("{context}: expected length {expected_len}, got {actual_len}");
    }

    tracing::trace!(context = context, "assertion passed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes_within_epsilon() {
        assert_approx_eq_logged("close", 10.0005, 10.0, 1e-3);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_assert_fits_panics_on_overflow() {
        assert_fits_logged("overflow", 101.0, 100.0);
    }
}
