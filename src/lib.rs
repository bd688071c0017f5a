//! Asynchronous higher-order functions over slices.
//!
//! Two families of combinators share the same callback shape,
//! `(element, index, slice) -> impl Future<Output = Result<_, E>>`:
//!
//! - [`map`], [`filter`] and [`flat_map`] start every callback at once and
//!   resolve when all of them have settled. Results keep slice order, not
//!   completion order.
//! - [`serial_map`], [`reduce`] and [`fold`] run one callback at a time in
//!   slice order and stop at the first failure.
//!
//! The same operations are available as methods through [`SliceAsyncExt`].
//!
//! ```
//! # #[tokio::main]
//! # async fn main() {
//! use std::convert::Infallible;
//!
//! let names = ["ash", "bob"];
//! let shouted = async_slice_hofs::map(&names, |name, _, _| {
//!     let name = *name;
//!     async move { Ok::<_, Infallible>(name.to_uppercase()) }
//! })
//! .await;
//!
//! assert_eq!(shouted, Ok(vec!["ASH".to_string(), "BOB".to_string()]));
//! # }
//! ```

use core::future::Future;

mod async_util;
pub mod concurrent;
mod error;
pub mod sequential;
mod slice;

pub use concurrent::Concurrent;
pub use error::ReduceError;
pub use sequential::{Reduce, Sequential};
pub use slice::SliceAsyncExt;

pub mod prelude {
    pub use crate::slice::SliceAsyncExt as _;
}

/// See [`SliceAsyncExt::async_filter`].
pub fn filter<'a, T, E, TFn, TFuture>(
    seq: &'a [T],
    predicate: TFn,
) -> Concurrent<'a, T, TFn, TFuture, concurrent::Kept, E>
where
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<bool, E>>,
{
    seq.async_filter(predicate)
}

/// See [`SliceAsyncExt::async_map`].
pub fn map<'a, T, R, E, TFn, TFuture>(
    seq: &'a [T],
    f: TFn,
) -> Concurrent<'a, T, TFn, TFuture, concurrent::Mapped<R>, E>
where
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<R, E>>,
{
    seq.async_map(f)
}

/// See [`SliceAsyncExt::async_flat_map`].
pub fn flat_map<'a, T, I, E, TFn, TFuture>(
    seq: &'a [T],
    f: TFn,
) -> Concurrent<'a, T, TFn, TFuture, concurrent::Flattened<I>, E>
where
    I: IntoIterator,
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<I, E>>,
{
    seq.async_flat_map(f)
}

/// See [`SliceAsyncExt::async_serial_map`].
pub fn serial_map<'a, T, R, E, TFn, TFuture>(
    seq: &'a [T],
    f: TFn,
) -> Sequential<'a, T, TFn, sequential::Collect<R>>
where
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<R, E>>,
{
    seq.async_serial_map(f)
}

/// See [`SliceAsyncExt::async_reduce`].
pub fn reduce<'a, T, E, TFn, TFuture>(seq: &'a [T], f: TFn) -> Reduce<'a, T, TFn>
where
    T: Clone,
    TFn: FnMut(T, &'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<T, E>>,
{
    seq.async_reduce(f)
}

/// See [`SliceAsyncExt::async_fold`].
pub fn fold<'a, T, A, E, TFn, TFuture>(
    seq: &'a [T],
    init: A,
    f: TFn,
) -> Sequential<'a, T, TFn, sequential::Fold<A>>
where
    TFn: FnMut(A, &'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<A, E>>,
{
    seq.async_fold(init, f)
}
