use core::future::Future;
use core::marker::PhantomData;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::future::FusedFuture;
use pin_project::pin_project;
use tracing::{debug, trace};

use crate::async_util::{ready, OptionPinned, Position};
use crate::error::ReduceError;

/// How a sequential combinator starts a callback from its accumulator, and how
/// the callback's result becomes the next accumulator.
///
/// While a callback runs, `launch` may set part of the accumulator aside as
/// `Held`; `land` gets it back together with the callback's result.
pub trait Drive<'a, T, TFn> {
    type Acc;
    type Held;
    type Item;
    type Error;
    type Future: Future<Output = Result<Self::Item, Self::Error>>;

    fn launch(
        f: &mut TFn,
        acc: Self::Acc,
        element: &'a T,
        index: usize,
        seq: &'a [T],
    ) -> (Self::Held, Self::Future);

    fn land(held: Self::Held, item: Self::Item) -> Self::Acc;
}

/// Pushes each callback result onto a `Vec`, in slice order.
pub struct Collect<R>(PhantomData<fn() -> R>);

impl<'a, T: 'a, R, E, TFn, TFuture> Drive<'a, T, TFn> for Collect<R>
where
    TFn: FnMut(&'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<R, E>>,
{
    type Acc = Vec<R>;
    type Held = Vec<R>;
    type Item = R;
    type Error = E;
    type Future = TFuture;

    #[inline(always)]
    fn launch(
        f: &mut TFn,
        acc: Self::Acc,
        element: &'a T,
        index: usize,
        seq: &'a [T],
    ) -> (Self::Held, Self::Future) {
        (acc, f(element, index, seq))
    }

    #[inline(always)]
    fn land(mut held: Self::Held, item: Self::Item) -> Self::Acc {
        held.push(item);
        held
    }
}

/// Hands the accumulator to the callback and takes its result as the new one.
pub struct Fold<A>(PhantomData<fn() -> A>);

impl<'a, T: 'a, A, E, TFn, TFuture> Drive<'a, T, TFn> for Fold<A>
where
    TFn: FnMut(A, &'a T, usize, &'a [T]) -> TFuture,
    TFuture: Future<Output = Result<A, E>>,
{
    type Acc = A;
    type Held = ();
    type Item = A;
    type Error = E;
    type Future = TFuture;

    #[inline(always)]
    fn launch(
        f: &mut TFn,
        acc: Self::Acc,
        element: &'a T,
        index: usize,
        seq: &'a [T],
    ) -> (Self::Held, Self::Future) {
        ((), f(acc, element, index, seq))
    }

    #[inline(always)]
    fn land(_: Self::Held, item: Self::Item) -> Self::Acc {
        item
    }
}

#[pin_project(project = StepProj)]
enum Step<TAcc, THeld, TFuture> {
    Idle(Option<TAcc>),
    Running {
        held: Option<THeld>,
        #[pin]
        future: TFuture,
    },
    Done,
}

/// Future returned by [`async_serial_map`] and [`async_fold`].
///
/// Callbacks run one at a time in slice order; the callback for an element is
/// only invoked after the previous one has completed. The first failure ends
/// the iteration.
///
/// [`async_serial_map`]: crate::SliceAsyncExt::async_serial_map
/// [`async_fold`]: crate::SliceAsyncExt::async_fold
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct Sequential<'a, T, TFn, TDrive>
where
    TDrive: Drive<'a, T, TFn>,
{
    seq: &'a [T],
    index: usize,
    f: TFn,
    #[pin]
    step: Step<TDrive::Acc, TDrive::Held, TDrive::Future>,
    _drive: PhantomData<fn() -> TDrive>,
}

impl<'a, T, TFn, TDrive> Sequential<'a, T, TFn, TDrive>
where
    TDrive: Drive<'a, T, TFn>,
{
    pub(crate) fn new(seq: &'a [T], start: usize, acc: TDrive::Acc, f: TFn) -> Self {
        Self {
            seq,
            index: start,
            f,
            step: Step::Idle(Some(acc)),
            _drive: PhantomData,
        }
    }
}

impl<'a, T, TFn, TDrive> Future for Sequential<'a, T, TFn, TDrive>
where
    TDrive: Drive<'a, T, TFn>,
{
    type Output = Result<TDrive::Acc, TDrive::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        use StepProj::*;

        let mut me = self.project();
        let seq: &'a [T] = *me.seq;

        loop {
            match me.step.as_mut().project() {
                Idle(acc) => {
                    let acc = acc.take().expect("Sequential polled after completion");

                    let Some(element) = seq.get(*me.index) else {
                        me.step.set(Step::Done);
                        return Poll::Ready(Ok(acc));
                    };

                    let position = Position::new(*me.index, seq.len());
                    trace!(
                        index = position.index,
                        last = position.is_last(),
                        "invoking sequential callback"
                    );

                    let (held, future) = TDrive::launch(me.f, acc, element, *me.index, seq);
                    me.step.set(Step::Running {
                        held: Some(held),
                        future,
                    });
                }

                Running { held, future } => {
                    let outcome = ready!(future.poll(cx));
                    let held = held.take().expect("Sequential lost its held accumulator");

                    match outcome {
                        Ok(item) => {
                            *me.index += 1;
                            me.step.set(Step::Idle(Some(TDrive::land(held, item))));
                        }
                        Err(e) => {
                            debug!(
                                index = *me.index,
                                skipped = seq.len() - *me.index - 1,
                                "sequential callback failed, aborting"
                            );
                            me.step.set(Step::Done);
                            return Poll::Ready(Err(e));
                        }
                    }
                }

                Done => panic!("Sequential polled after completion"),
            }
        }
    }
}

impl<'a, T, TFn, TDrive> FusedFuture for Sequential<'a, T, TFn, TDrive>
where
    TDrive: Drive<'a, T, TFn>,
{
    fn is_terminated(&self) -> bool {
        matches!(self.step, Step::Done)
    }
}

/// Future returned by [`async_reduce`].
///
/// Seeds the accumulator with the first element and folds the rest. Resolves to
/// [`ReduceError::EmptyWithoutSeed`] on an empty slice without invoking the
/// callback.
///
/// [`async_reduce`]: crate::SliceAsyncExt::async_reduce
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project]
pub struct Reduce<'a, T, TFn>
where
    Fold<T>: Drive<'a, T, TFn, Acc = T>,
{
    #[pin]
    inner: OptionPinned<Sequential<'a, T, TFn, Fold<T>>>,
    reported: bool,
}

impl<'a, T, TFn> Reduce<'a, T, TFn>
where
    T: Clone,
    Fold<T>: Drive<'a, T, TFn, Acc = T>,
{
    pub(crate) fn new(seq: &'a [T], f: TFn) -> Self {
        let inner = match seq.first() {
            Some(seed) => {
                OptionPinned::Some(Sequential::<_, _, Fold<T>>::new(seq, 1, seed.clone(), f))
            }
            None => OptionPinned::None,
        };

        Self {
            inner,
            reported: false,
        }
    }
}

impl<'a, T, TFn> Future for Reduce<'a, T, TFn>
where
    Fold<T>: Drive<'a, T, TFn, Acc = T>,
{
    type Output = Result<T, ReduceError<<Fold<T> as Drive<'a, T, TFn>>::Error>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.project();

        match me.inner.project().as_pin_mut() {
            Some(inner) => inner.poll(cx).map_err(ReduceError::Callback),
            None => {
                assert!(!*me.reported, "Reduce polled after completion");
                *me.reported = true;
                debug!("reduce called on an empty slice without a seed");
                Poll::Ready(Err(ReduceError::EmptyWithoutSeed))
            }
        }
    }
}

impl<'a, T, TFn> FusedFuture for Reduce<'a, T, TFn>
where
    Fold<T>: Drive<'a, T, TFn, Acc = T>,
{
    fn is_terminated(&self) -> bool {
        match &self.inner {
            OptionPinned::Some(inner) => inner.is_terminated(),
            OptionPinned::None => self.reported,
        }
    }
}
