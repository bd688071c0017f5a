use core::future::Future;
use core::marker::PhantomData;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::future::FusedFuture;
use pin_project::pin_project;
use tracing::{debug, trace};

/// Decides what a settled callback contributes to the output of a concurrent
/// combinator, and how the per-position contributions are folded together once
/// every callback has settled.
pub trait Combine<'a, T> {
    /// Success value of a single callback.
    type Item;
    /// What is kept for one position until all positions have settled.
    type Interim;
    type Output;

    fn settle(element: &'a T, item: Self::Item) -> Self::Interim;

    fn finish(interims: Vec<Self::Interim>) -> Self::Output;
}

/// Keeps callback results as they are.
pub struct Mapped<R>(PhantomData<fn() -> R>);

impl<'a, T: 'a, R> Combine<'a, T> for Mapped<R> {
    type Item = R;
    type Interim = R;
    type Output = Vec<R>;

    #[inline(always)]
    fn settle(_: &'a T, item: Self::Item) -> Self::Interim {
        item
    }

    #[inline(always)]
    fn finish(interims: Vec<Self::Interim>) -> Self::Output {
        interims
    }
}

/// Keeps the element when its predicate resolved to `true`.
///
/// Rejected positions are marked `None` and compacted away in `finish`.
pub struct Kept;

impl<'a, T: 'a> Combine<'a, T> for Kept {
    type Item = bool;
    type Interim = Option<&'a T>;
    type Output = Vec<&'a T>;

    #[inline(always)]
    fn settle(element: &'a T, keep: Self::Item) -> Self::Interim {
        keep.then_some(element)
    }

    fn finish(interims: Vec<Self::Interim>) -> Self::Output {
        interims.into_iter().flatten().collect()
    }
}

/// Splices every callback result into the output, one level deep.
pub struct Flattened<I>(PhantomData<fn() -> I>);

impl<'a, T: 'a, I: IntoIterator> Combine<'a, T> for Flattened<I> {
    type Item = I;
    type Interim = I;
    type Output = Vec<I::Item>;

    #[inline(always)]
    fn settle(_: &'a T, item: Self::Item) -> Self::Interim {
        item
    }

    fn finish(interims: Vec<Self::Interim>) -> Self::Output {
        interims.into_iter().flatten().collect()
    }
}

enum Slot<TFuture, TInterim> {
    Running(Pin<Box<TFuture>>),
    Settled(TInterim),
    Failed,
}

#[pin_project(project = StateProj)]
enum State<'a, T, TFn, TFuture, TInterim, TError> {
    Pending(Option<(&'a [T], TFn)>),
    Polling {
        seq: &'a [T],
        slots: Vec<Slot<TFuture, TInterim>>,
        remaining: usize,
        first_error: Option<TError>,
    },
    Done,
}

/// Future returned by [`async_map`], [`async_filter`] and [`async_flat_map`].
///
/// Every callback is started on the first poll and all of them are polled
/// together. The future resolves once each callback has settled, with results
/// in slice order, or with the error of the first callback that failed.
///
/// [`async_map`]: crate::SliceAsyncExt::async_map
/// [`async_filter`]: crate::SliceAsyncExt::async_filter
/// [`async_flat_map`]: crate::SliceAsyncExt::async_flat_map
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct Concurrent<'a, T, TFn, TFuture, TCombine, TError>
where
    TCombine: Combine<'a, T>,
{
    #[pin]
    state: State<'a, T, TFn, TFuture, TCombine::Interim, TError>,
    _combine: PhantomData<fn() -> TCombine>,
}

impl<'a, T, TFn, TFuture, TCombine, TError> Concurrent<'a, T, TFn, TFuture, TCombine, TError>
where
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<TCombine::Item, TError>>,
    TCombine: Combine<'a, T>,
{
    pub(crate) fn new(seq: &'a [T], f: TFn) -> Self {
        Self {
            state: State::Pending(Some((seq, f))),
            _combine: PhantomData,
        }
    }
}

impl<'a, T, TFn, TFuture, TCombine, TError> Future
    for Concurrent<'a, T, TFn, TFuture, TCombine, TError>
where
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<TCombine::Item, TError>>,
    TCombine: Combine<'a, T>,
{
    type Output = Result<TCombine::Output, TError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        use StateProj::*;

        let mut state = self.project().state;

        if let Pending(payload) = state.as_mut().project() {
            let (seq, mut f) = payload.take().expect("Concurrent polled twice");
            trace!(len = seq.len(), "launching concurrent callbacks");

            let slots = seq
                .iter()
                .enumerate()
                .map(|(index, element)| Slot::Running(Box::pin(f(element, index, seq))))
                .collect();

            state.set(State::Polling {
                seq,
                slots,
                remaining: seq.len(),
                first_error: None,
            });
        }

        let (seq, slots, remaining, first_error) = match state.as_mut().project() {
            Polling {
                seq,
                slots,
                remaining,
                first_error,
            } => (*seq, slots, remaining, first_error),
            Done => panic!("Concurrent polled after completion"),
            Pending(_) => unreachable!(),
        };

        for (index, slot) in slots.iter_mut().enumerate() {
            let Slot::Running(future) = slot else {
                continue;
            };

            let outcome = match future.as_mut().poll(cx) {
                Poll::Ready(outcome) => outcome,
                Poll::Pending => continue,
            };

            *remaining -= 1;
            *slot = match outcome {
                Ok(item) => Slot::Settled(TCombine::settle(&seq[index], item)),
                Err(e) => {
                    debug!(index, "concurrent callback failed");
                    if first_error.is_none() {
                        *first_error = Some(e);
                    }
                    Slot::Failed
                }
            };
        }

        if *remaining > 0 {
            return Poll::Pending;
        }

        let slots = core::mem::take(slots);
        let first_error = first_error.take();
        state.set(State::Done);

        if let Some(e) = first_error {
            return Poll::Ready(Err(e));
        }

        let interims = slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Settled(interim) => Some(interim),
                Slot::Running(_) | Slot::Failed => None,
            })
            .collect();

        Poll::Ready(Ok(TCombine::finish(interims)))
    }
}

impl<'a, T, TFn, TFuture, TCombine, TError> FusedFuture
    for Concurrent<'a, T, TFn, TFuture, TCombine, TError>
where
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<TCombine::Item, TError>>,
    TCombine: Combine<'a, T>,
{
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Done)
    }
}
