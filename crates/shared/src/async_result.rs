use futures::stream::BoxStream;

use crate::error::FetchError;

/// Stream of emissions from a source that may be loading or failing.
pub type ResultStream<T> = BoxStream<'static, AsyncResult<T>>;

#[derive(Debug, Clone, PartialEq)]
pub enum AsyncResult<T> {
    Pending,
    Success(T),
    Failure(FetchError),
}

impl<T> AsyncResult<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn get_or_default(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Pending | Self::Failure(_) => default,
        }
    }

    pub fn get_error_or_none(&self) -> Option<&FetchError> {
        match self {
            Self::Failure(err) => Some(err),
            Self::Pending | Self::Success(_) => None,
        }
    }

    /// `None` while pending.
    pub fn into_result(self) -> Option<Result<T, FetchError>> {
        match self {
            Self::Pending => None,
            Self::Success(value) => Some(Ok(value)),
            Self::Failure(err) => Some(Err(err)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AsyncResult<U> {
        match self {
            Self::Pending => AsyncResult::Pending,
            Self::Success(value) => AsyncResult::Success(f(value)),
            Self::Failure(err) => AsyncResult::Failure(err),
        }
    }
}

impl<T> Default for AsyncResult<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> From<Result<T, FetchError>> for AsyncResult<T> {
    fn from(value: Result<T, FetchError>) -> Self {
        match value {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags<T>(result: &AsyncResult<T>) -> [bool; 3] {
        [result.is_pending(), result.is_success(), result.is_failure()]
    }

    #[test]
    fn exactly_one_predicate_holds() {
        let samples = [
            AsyncResult::Pending,
            AsyncResult::Success(7),
            AsyncResult::Failure(FetchError::transient("exploration", "offline")),
        ];
        for sample in &samples {
            assert_eq!(
                flags(sample).iter().filter(|flag| **flag).count(),
                1,
                "{sample:?}"
            );
        }
    }

    #[test]
    fn get_or_default_only_returns_success_value() {
        assert_eq!(AsyncResult::Success(3).get_or_default(0), 3);
        assert_eq!(AsyncResult::<i32>::Pending.get_or_default(0), 0);
        assert_eq!(
            AsyncResult::<i32>::Failure(FetchError::transient("preference", "io")).get_or_default(9),
            9
        );
    }

    #[test]
    fn error_is_exposed_only_on_failure() {
        let failure = AsyncResult::<()>::Failure(FetchError::transient("preference", "io"));
        assert_eq!(
            failure.get_error_or_none().map(FetchError::source_name),
            Some("preference")
        );
        assert!(AsyncResult::Success(()).get_error_or_none().is_none());
        assert!(AsyncResult::<()>::Pending.get_error_or_none().is_none());
    }

    #[test]
    fn into_result_is_none_only_while_pending() {
        assert_eq!(AsyncResult::<u8>::Pending.into_result(), None);
        assert_eq!(AsyncResult::Success(4).into_result(), Some(Ok(4)));
        let err = FetchError::transient("preference", "locked");
        assert_eq!(
            AsyncResult::<u8>::Failure(err.clone()).into_result(),
            Some(Err(err))
        );
    }

    #[test]
    fn map_transforms_only_the_success_value() {
        assert_eq!(
            AsyncResult::Success(2).map(|n| n * 10),
            AsyncResult::Success(20)
        );
        assert!(AsyncResult::<i32>::Pending.map(|n| n * 10).is_pending());
        assert_eq!(
            AsyncResult::<i32>::Failure(FetchError::transient("exploration", "gone"))
                .map(|n| n.to_string())
                .get_error_or_none()
                .map(FetchError::message),
            Some("gone")
        );
    }

    #[test]
    fn converts_from_result() {
        let ok: AsyncResult<u8> = Ok(1).into();
        assert_eq!(ok, AsyncResult::Success(1));
        let err: AsyncResult<u8> = Err(FetchError::transient("exploration", "gone")).into();
        assert!(err.is_failure());
    }
}
