//! Errors produced by [`async_reduce`](crate::SliceAsyncExt::async_reduce).

/// Failure of a reduce without an initial value.
///
/// Every other combinator surfaces the callback's error as-is; only reducing
/// without a seed has a failure of its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReduceError<E> {
    /// The slice was empty, so there was no first element to seed the
    /// accumulator with. The callback was never invoked.
    #[error("cannot reduce an empty slice without an initial value")]
    EmptyWithoutSeed,
    /// The callback failed; carries its error untouched.
    #[error("reduce callback failed: {0}")]
    Callback(E),
}

impl<E> ReduceError<E> {
    pub fn is_empty_without_seed(&self) -> bool {
        matches!(self, Self::EmptyWithoutSeed)
    }

    /// Returns the callback's error, if that is what this is.
    pub fn into_callback(self) -> Option<E> {
        match self {
            Self::Callback(e) => Some(e),
            Self::EmptyWithoutSeed => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::ReduceError;

    #[test]
    fn display() {
        assert_eq!(
            ReduceError::<String>::EmptyWithoutSeed.to_string(),
            "cannot reduce an empty slice without an initial value",
        );
        assert_eq!(
            ReduceError::Callback("boom").to_string(),
            "reduce callback failed: boom",
        );
    }

    #[test]
    fn into_callback() {
        assert_eq!(ReduceError::Callback(3).into_callback(), Some(3));
        assert_eq!(ReduceError::<i32>::EmptyWithoutSeed.into_callback(), None);
        assert!(ReduceError::<i32>::EmptyWithoutSeed.is_empty_without_seed());
        assert!(!ReduceError::Callback(3).is_empty_without_seed());
    }
}
