use core::pin::Pin;
use pin_project::pin_project;

macro_rules! ready {
    ($poll: expr) => {
        match $poll {
            core::task::Poll::Ready(r) => r,
            core::task::Poll::Pending => return core::task::Poll::Pending,
        }
    };
}

pub(crate) use ready;

/// `Option` whose payload can be pinned in place.
#[pin_project(project = OptionPinnedProj)]
pub(crate) enum OptionPinned<T> {
    Some(#[pin] T),
    None,
}

impl<'a, T> OptionPinnedProj<'a, T> {
    pub(crate) fn as_pin_mut(self) -> Option<Pin<&'a mut T>> {
        use OptionPinnedProj::*;
        match self {
            Some(t) => core::option::Option::Some(t),
            None => core::option::Option::None,
        }
    }
}

/// Where a callback invocation sits relative to the slice it was taken from.
///
/// Carried in log events so a failing callback can be traced back to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) index: usize,
    pub(crate) len: usize,
}

impl Position {
    pub(crate) fn new(index: usize, len: usize) -> Self {
        Self { index, len }
    }

    pub(crate) fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }
}
