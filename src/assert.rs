//! Assertion library
//!
//! Checks that either return `Ok(())` or raise a [`Failure`] carrying the
//! caller's source location. Bodies chain them with `?`.

use std::borrow::Cow;

use crate::failure::Failure;

/// Values that can be compared by [`assert_equal`].
///
/// Text types describe the mismatch so the failure message reads
/// `"<message> (<expected> is not <actual>)"`. Other types keep the
/// message as given. Implement it with an empty block for your own types.
pub trait Assertable: PartialEq {
    fn describe_mismatch(expected: &Self, actual: &Self) -> Option<String> {
        let _ = (expected, actual);
        None
    }
}

macro_rules! opaque_assertable {
    ($($ty:ty),* $(,)?) => {
        $(impl Assertable for $ty {})*
    };
}

opaque_assertable!(
    bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, ()
);

impl<T: PartialEq> Assertable for Option<T> {}
impl<T: PartialEq> Assertable for Vec<T> {}
impl<T: PartialEq> Assertable for &[T] {}

macro_rules! text_assertable {
    ($($ty:ty),* $(,)?) => {
        $(impl Assertable for $ty {
            fn describe_mismatch(expected: &Self, actual: &Self) -> Option<String> {
                Some(format!("{expected} is not {actual}"))
            }
        })*
    };
}

text_assertable!(&str, String, Box<str>, Cow<'_, str>, char);

/// Fail unless `condition` holds
#[track_caller]
pub fn assert_true(condition: bool, message: impl Into<String>) -> Result<(), Failure> {
    if condition {
        Ok(())
    } else {
        Err(Failure::new(message))
    }
}

/// Fail if `condition` holds
#[track_caller]
pub fn assert_false(condition: bool, message: impl Into<String>) -> Result<(), Failure> {
    if condition {
        Err(Failure::new(message))
    } else {
        Ok(())
    }
}

/// Fail unless `expected == actual`
#[track_caller]
pub fn assert_equal<T: Assertable>(
    expected: T,
    actual: T,
    message: impl Into<String>,
) -> Result<(), Failure> {
    if expected == actual {
        return Ok(());
    }

    let message = message.into();
    match T::describe_mismatch(&expected, &actual) {
        Some(detail) => Err(Failure::new(format!("{message} ({detail})"))),
        None => Err(Failure::new(message)),
    }
}

/// Fail unconditionally
#[track_caller]
pub fn fail(message: impl Into<String>) -> Result<(), Failure> {
    Err(Failure::new(message))
}

/// Run `procedure` and expect it to raise an error of kind `K`.
///
/// Returns `Ok(())` when it does. Returns a [`Failure`] when it raises
/// nothing. Any other error is handed back unchanged, so it reaches the
/// engine as an uncaught error.
#[track_caller]
pub fn assert_throws<K, T, E>(procedure: impl FnOnce() -> Result<T, E>) -> anyhow::Result<()>
where
    K: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    E: Into<anyhow::Error>,
{
    assert_throws_if::<K, T, E>(procedure, |_| true)
}

/// Like [`assert_throws`], but the raised `K` must also satisfy `predicate`.
///
/// Useful for matching a single variant of an error enum. An error of kind
/// `K` rejected by the predicate counts as a different kind.
#[track_caller]
pub fn assert_throws_if<K, T, E>(
    procedure: impl FnOnce() -> Result<T, E>,
    predicate: impl FnOnce(&K) -> bool,
) -> anyhow::Result<()>
where
    K: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    E: Into<anyhow::Error>,
{
    let err: anyhow::Error = match procedure() {
        Ok(_) => {
            return Err(Failure::new(format!(
                "expected `{}` to be raised, but nothing was raised",
                std::any::type_name::<K>()
            ))
            .into());
        }
        Err(err) => err.into(),
    };

    if err.downcast_ref::<K>().is_some_and(predicate) {
        Ok(())
    } else {
        Err(err)
    }
}
