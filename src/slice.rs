use core::future::Future;

use crate::concurrent::{Concurrent, Flattened, Kept, Mapped};
use crate::sequential::{Collect, Fold, Reduce, Sequential};

/// Asynchronous higher-order functions over slices.
///
/// Callbacks receive the element, its index and the whole slice, and return a
/// [`Future`] resolving to a `Result`. An `Err` from any callback fails the
/// whole combinator with that same error.
///
/// `async_map`, `async_filter` and `async_flat_map` start every callback at
/// once and wait for all of them. `async_serial_map`, `async_reduce` and
/// `async_fold` run one callback at a time, in slice order.
pub trait SliceAsyncExt<T> {
    /// Basically same as [`Iterator::map`] + `collect`, but it accepts closure
    /// that returns [`Future`]. All callbacks run concurrently; the output keeps
    /// slice order no matter which callback finishes first.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[tokio::main]
    /// # async fn main() {
    /// use async_slice_hofs::prelude::*;
    /// use std::convert::Infallible;
    ///
    /// assert_eq!(
    ///     [1, 2, 3]
    ///         .async_map(|x, _, _| {
    ///             let x = *x;
    ///             async move { Ok::<_, Infallible>(x + 1) }
    ///         })
    ///         .await,
    ///     Ok(vec![2, 3, 4]),
    /// );
    /// # }
    /// ```
    ///
    /// If any callback fails, every other callback is still driven to
    /// completion before the first failure is returned.
    fn async_map<'a, R, E, TFn, TFuture>(
        &'a self,
        f: TFn,
    ) -> Concurrent<'a, T, TFn, TFuture, Mapped<R>, E>
    where
        T: 'a,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<R, E>>;

    /// Basically same as [`Iterator::filter`] + `collect`, but the predicate
    /// returns [`Future`]. Predicates run concurrently.
    ///
    /// The kept elements are borrowed from the slice, in slice order.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[tokio::main]
    /// # async fn main() {
    /// use async_slice_hofs::prelude::*;
    /// use std::convert::Infallible;
    ///
    /// assert_eq!(
    ///     [1, 2, 3]
    ///         .async_filter(|x, _, _| {
    ///             let x = *x;
    ///             async move { Ok::<_, Infallible>(x != 2) }
    ///         })
    ///         .await,
    ///     Ok(vec![&1, &3]),
    /// );
    /// # }
    /// ```
    fn async_filter<'a, E, TFn, TFuture>(
        &'a self,
        predicate: TFn,
    ) -> Concurrent<'a, T, TFn, TFuture, Kept, E>
    where
        T: 'a,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<bool, E>>;

    /// Basically same as [`Iterator::flat_map`] + `collect`, but it accepts
    /// closure that returns [`Future`]. Callbacks run concurrently.
    ///
    /// Each callback contributes anything [`IntoIterator`]; a single value can
    /// be returned as `[x]` or `Some(x)`. Only that one level is flattened.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[tokio::main]
    /// # async fn main() {
    /// use async_slice_hofs::prelude::*;
    /// use std::convert::Infallible;
    ///
    /// assert_eq!(
    ///     [1, 2]
    ///         .async_flat_map(|x, _, _| {
    ///             let x = *x;
    ///             async move { Ok::<_, Infallible>(vec![x, x * 10]) }
    ///         })
    ///         .await,
    ///     Ok(vec![1, 10, 2, 20]),
    /// );
    /// # }
    /// ```
    fn async_flat_map<'a, I, E, TFn, TFuture>(
        &'a self,
        f: TFn,
    ) -> Concurrent<'a, T, TFn, TFuture, Flattened<I>, E>
    where
        T: 'a,
        I: IntoIterator,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<I, E>>;

    /// Like [`async_map`](SliceAsyncExt::async_map), but the callback for an
    /// element is invoked only after the previous one has completed. Stops at
    /// the first failure; later elements are never visited.
    fn async_serial_map<'a, R, E, TFn, TFuture>(
        &'a self,
        f: TFn,
    ) -> Sequential<'a, T, TFn, Collect<R>>
    where
        T: 'a,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<R, E>>;

    /// Basically same as [`Iterator::reduce`], but it accepts closure that
    /// returns [`Future`]. The first element seeds the accumulator, so the
    /// callback first sees index `1`.
    ///
    /// Fails with [`ReduceError::EmptyWithoutSeed`] on an empty slice; use
    /// [`async_fold`](SliceAsyncExt::async_fold) when a seed is at hand.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[tokio::main]
    /// # async fn main() {
    /// use async_slice_hofs::prelude::*;
    /// use async_slice_hofs::ReduceError;
    /// use std::convert::Infallible;
    ///
    /// assert_eq!(
    ///     [1, 2, 3]
    ///         .async_reduce(|acc, x, _, _| {
    ///             let x = *x;
    ///             async move { Ok::<_, Infallible>(acc + x * 2) }
    ///         })
    ///         .await,
    ///     Ok(11),
    /// );
    ///
    /// let empty: [i32; 0] = [];
    /// assert_eq!(
    ///     empty
    ///         .async_reduce(|acc, x, _, _| {
    ///             let x = *x;
    ///             async move { Ok::<_, Infallible>(acc + x) }
    ///         })
    ///         .await,
    ///     Err(ReduceError::EmptyWithoutSeed),
    /// );
    /// # }
    /// ```
    ///
    /// [`ReduceError::EmptyWithoutSeed`]: crate::ReduceError::EmptyWithoutSeed
    fn async_reduce<'a, E, TFn, TFuture>(&'a self, f: TFn) -> Reduce<'a, T, TFn>
    where
        T: Clone + 'a,
        TFn: FnMut(T, &'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<T, E>>;

    /// Basically same as [`Iterator::fold`], but it accepts closure that
    /// returns [`Future`]. Callbacks run one at a time in slice order.
    ///
    /// `init` is always used as the seed, whatever its value.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[tokio::main]
    /// # async fn main() {
    /// use async_slice_hofs::prelude::*;
    /// use std::convert::Infallible;
    ///
    /// assert_eq!(
    ///     [1, 2, 3]
    ///         .async_fold(String::from("Elements:"), |acc, x, _, _| {
    ///             let x = *x;
    ///             async move { Ok::<_, Infallible>(format!("{acc} {x}")) }
    ///         })
    ///         .await,
    ///     Ok("Elements: 1 2 3".to_string()),
    /// );
    /// # }
    /// ```
    fn async_fold<'a, A, E, TFn, TFuture>(
        &'a self,
        init: A,
        f: TFn,
    ) -> Sequential<'a, T, TFn, Fold<A>>
    where
        T: 'a,
        TFn: FnMut(A, &'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<A, E>>;
}

impl<T> SliceAsyncExt<T> for [T] {
    fn async_map<'a, R, E, TFn, TFuture>(
        &'a self,
        f: TFn,
    ) -> Concurrent<'a, T, TFn, TFuture, Mapped<R>, E>
    where
        T: 'a,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<R, E>>,
    {
        Concurrent::new(self, f)
    }

    fn async_filter<'a, E, TFn, TFuture>(
        &'a self,
        predicate: TFn,
    ) -> Concurrent<'a, T, TFn, TFuture, Kept, E>
    where
        T: 'a,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<bool, E>>,
    {
        Concurrent::new(self, predicate)
    }

    fn async_flat_map<'a, I, E, TFn, TFuture>(
        &'a self,
        f: TFn,
    ) -> Concurrent<'a, T, TFn, TFuture, Flattened<I>, E>
    where
        T: 'a,
        I: IntoIterator,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<I, E>>,
    {
        Concurrent::new(self, f)
    }

    fn async_serial_map<'a, R, E, TFn, TFuture>(
        &'a self,
        f: TFn,
    ) -> Sequential<'a, T, TFn, Collect<R>>
    where
        T: 'a,
        TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<R, E>>,
    {
        Sequential::new(self, 0, Vec::with_capacity(self.len()), f)
    }

    fn async_reduce<'a, E, TFn, TFuture>(&'a self, f: TFn) -> Reduce<'a, T, TFn>
    where
        T: Clone + 'a,
        TFn: FnMut(T, &'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<T, E>>,
    {
        Reduce::new(self, f)
    }

    fn async_fold<'a, A, E, TFn, TFuture>(
        &'a self,
        init: A,
        f: TFn,
    ) -> Sequential<'a, T, TFn, Fold<A>>
    where
        T: 'a,
        TFn: FnMut(A, &'a T, usize, &'a [T]) -> TFuture,
        TFuture: Future<Output = Result<A, E>>,
    {
        Sequential::new(self, 0, init, f)
    }
}

#[cfg(test)]
mod test {
    use super::SliceAsyncExt;
    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::time::Duration;

    async fn staggered(index: usize) {
        let millis = [50, 5, 20][index];
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: &'static str,
        surname: &'static str,
    }

    #[tokio::test]
    async fn map() {
        assert_eq!(
            [1, 2, 3]
                .async_map(|x, _, _| {
                    let x = *x;
                    async move { Ok::<_, Infallible>(format!("The number is {x}")) }
                })
                .await,
            Ok(vec![
                "The number is 1".to_string(),
                "The number is 2".into(),
                "The number is 3".into(),
            ]),
        );

        let people = vec![
            Person { name: "Bob", surname: "Dylan" },
            Person { name: "Ash", surname: "Ketchum" },
        ];
        assert_eq!(
            people
                .async_map(|p, _, _| async move {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok::<_, Infallible>(format!("{} {}", p.name, p.surname))
                })
                .await,
            Ok(vec!["Bob Dylan".to_string(), "Ash Ketchum".into()]),
        );
    }

    #[tokio::test]
    async fn map_keeps_falsy_results() {
        assert_eq!(
            ["", "a", ""]
                .async_map(|s, _, _| {
                    let s = *s;
                    async move { Ok::<_, Infallible>((s.len(), s)) }
                })
                .await,
            Ok(vec![(0, ""), (1, "a"), (0, "")]),
        );
    }

    #[tokio::test]
    async fn map_passes_index_and_slice() {
        let seq = [10, 20, 30];

        assert_eq!(
            seq.async_map(|x, index, whole| {
                let seen = (*x, index, whole.len());
                async move { Ok::<_, Infallible>(seen) }
            })
            .await,
            Ok(vec![(10, 0, 3), (20, 1, 3), (30, 2, 3)]),
        );
    }

    #[tokio::test]
    async fn map_fails_when_any_callback_fails() {
        let settled = RefCell::new(0);

        let mapped = [1, 2, 3]
            .async_map(|x, _, _| {
                let settled = &settled;
                let x = *x;
                async move {
                    tokio::task::yield_now().await;
                    *settled.borrow_mut() += 1;
                    if x == 1 {
                        Err("one")
                    } else {
                        Ok(x)
                    }
                }
            })
            .await;

        assert_eq!(mapped, Err("one"));
        assert_eq!(settled.into_inner(), 3);
    }

    #[tokio::test]
    async fn filter() {
        assert_eq!(
            [1, 2, 3, 4]
                .async_filter(|x, _, _| {
                    let x = *x;
                    async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Ok::<_, Infallible>(x % 2 == 0)
                    }
                })
                .await,
            Ok(vec![&2, &4]),
        );

        let values = [Some(1), None, Some(0), None];
        assert_eq!(
            values
                .async_filter(|v, _, _| {
                    let keep = v.is_none();
                    async move { Ok::<_, Infallible>(keep) }
                })
                .await,
            Ok(vec![&None, &None]),
        );
    }

    #[tokio::test(start_paused = true)]
    async fn filter_runs_concurrently() {
        let seq = ["FIRST", "SECOND", "THIRD"];
        let finished = RefCell::new(Vec::new());

        let filtered = seq
            .async_filter(|el, index, _| {
                let finished = &finished;
                async move {
                    staggered(index).await;
                    finished.borrow_mut().push(*el);
                    Ok::<_, Infallible>(index == 0)
                }
            })
            .await;

        assert_eq!(filtered, Ok(vec![&"FIRST"]));
        assert_eq!(finished.into_inner(), ["SECOND", "THIRD", "FIRST"]);
    }

    #[tokio::test]
    async fn filter_fails_when_any_predicate_fails() {
        let filtered = [1, 2, 3]
            .async_filter(|x, _, _| {
                let x = *x;
                async move {
                    if x == 3 {
                        Err(format!("{x} is not allowed"))
                    } else {
                        Ok(true)
                    }
                }
            })
            .await;

        assert_eq!(filtered, Err("3 is not allowed".to_string()));
    }

    #[tokio::test]
    async fn flat_map() {
        let pairs = [("uno", 1), ("due", 2), ("tre", 3)];

        assert_eq!(
            pairs
                .async_flat_map(|(name, n), _, _| async move {
                    Ok::<_, Infallible>([name.to_string(), (n + 1).to_string()])
                })
                .await,
            Ok(vec![
                "uno".to_string(),
                "2".into(),
                "due".into(),
                "3".into(),
                "tre".into(),
                "4".into(),
            ]),
        );
    }

    #[tokio::test]
    async fn flat_map_single_values() {
        assert_eq!(
            [1, 2, 3]
                .async_flat_map(|x, _, _| {
                    let x = *x;
                    async move { Ok::<_, Infallible>(Some(x).filter(|x| x % 2 == 1)) }
                })
                .await,
            Ok(vec![1, 3]),
        );
    }

    #[tokio::test]
    async fn flat_map_flattens_one_level() {
        let seq = [["uno", "due"], ["tre", "quattro"]];

        assert_eq!(
            seq.async_flat_map(|el, index, _| {
                let nested = vec![
                    vec![el[0].to_string()],
                    vec![el[1].to_string()],
                    vec![format!("NESTED {index}")],
                ];
                async move { Ok::<_, Infallible>(nested) }
            })
            .await,
            Ok(vec![
                vec!["uno".to_string()],
                vec!["due".to_string()],
                vec!["NESTED 0".to_string()],
                vec!["tre".to_string()],
                vec!["quattro".to_string()],
                vec!["NESTED 1".to_string()],
            ]),
        );
    }

    #[tokio::test(start_paused = true)]
    async fn flat_map_runs_concurrently() {
        let seq = ["PRIMO", "SECONDO", "TERZO"];
        let finished = RefCell::new(Vec::new());

        let mapped = seq
            .async_flat_map(|el, index, _| {
                let finished = &finished;
                async move {
                    staggered(index).await;
                    finished.borrow_mut().push(*el);
                    Ok::<_, Infallible>([format!("{el}!")])
                }
            })
            .await;

        assert_eq!(
            mapped,
            Ok(vec!["PRIMO!".to_string(), "SECONDO!".into(), "TERZO!".into()]),
        );
        assert_eq!(finished.into_inner(), ["SECONDO", "TERZO", "PRIMO"]);
    }

    #[tokio::test]
    async fn serial_map() {
        assert_eq!(
            ["1", "2", "3"]
                .async_serial_map(|s, _, _| {
                    let s = *s;
                    async move { s.parse::<i32>() }
                })
                .await,
            Ok(vec![1, 2, 3]),
        );

        assert!(["1", "x"]
            .async_serial_map(|s, _, _| {
                let s = *s;
                async move { s.parse::<i32>() }
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn fold_into_other_type() {
        use std::collections::BTreeMap;

        let folded = [5, 6, 7]
            .async_fold(BTreeMap::new(), |mut acc, el, index, _| {
                let el = *el;
                async move {
                    acc.insert(format!("value{index}"), el);
                    Ok::<_, Infallible>(acc)
                }
            })
            .await;

        assert_eq!(
            folded,
            Ok(BTreeMap::from([
                ("value0".to_string(), 5),
                ("value1".to_string(), 6),
                ("value2".to_string(), 7),
            ])),
        );
    }

    #[tokio::test]
    async fn fold_with_element_typed_seed() {
        assert_eq!(
            [1, 2, 3]
                .async_fold(5, |acc, x, _, _| {
                    let x = *x;
                    async move { Ok::<_, Infallible>(acc + x) }
                })
                .await,
            Ok(11),
        );
    }

    #[tokio::test]
    async fn empty_slices() {
        let empty: Vec<i32> = Vec::new();

        assert_eq!(
            empty
                .async_map(|x, _, _| {
                    let x = *x;
                    async move { Ok::<_, Infallible>(x) }
                })
                .await,
            Ok(vec![]),
        );
        assert_eq!(
            empty
                .async_filter(|_, _, _| async move { Ok::<_, Infallible>(true) })
                .await,
            Ok(vec![]),
        );
        assert_eq!(
            empty
                .async_flat_map(|x, _, _| {
                    let x = *x;
                    async move { Ok::<_, Infallible>([x]) }
                })
                .await,
            Ok(vec![]),
        );
        assert_eq!(
            empty
                .async_serial_map(|x, _, _| {
                    let x = *x;
                    async move { Ok::<_, Infallible>(x) }
                })
                .await,
            Ok(vec![]),
        );
        assert_eq!(
            empty
                .async_fold(42, |acc, x, _, _| {
                    let x = *x;
                    async move { Ok::<_, Infallible>(acc + x) }
                })
                .await,
            Ok(42),
        );
    }
}
