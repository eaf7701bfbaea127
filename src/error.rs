use crate::ComponentId;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[cfg(windows)]
    #[error(transparent)]
    Api(#[from] windows::core::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("component manager has been disposed")]
    Disposed,
    #[error("component {0} is not registered")]
    NotRegistered(ComponentId),
    #[error("called from a thread other than the owning thread")]
    WrongThread,
    #[error("out of component ids")]
    OutOfComponentIds,
    #[error("refused by the component manager")]
    Refused,
}

impl Error {
    #[cfg(windows)]
    pub(crate) fn from_win32() -> Self {
        windows::core::Error::from_win32().into()
    }
}

pub type Result<T> = ::core::result::Result<T, Error>;
