//! Broker error taxonomy.

use thiserror::Error;

use quasar_core::error::{AppError, ErrorKind};

/// Errors raised by namespace and trigger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// Channel name does not match the channel grammar. Fatal to the socket.
    #[error("Invalid channel name '{0}'")]
    ProtocolViolation(String),
    /// Private/presence subscribe without credentials, or a trigger without
    /// a bearer token.
    #[error("Missing authorization: {0}")]
    AuthMissing(String),
    /// Credentials were supplied but the signature does not verify.
    #[error("Invalid signature: {0}")]
    AuthInvalid(String),
    /// No application registered under this key.
    #[error("Unknown application '{0}'")]
    UnknownApplication(String),
    /// A request field could not be parsed.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// The socket is not (or no longer) connected to this namespace.
    #[error("Socket {0} is not connected")]
    SocketNotFound(String),
}

impl BrokerError {
    /// HTTP-style status code reported to clients for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AuthMissing(_) | Self::Validation(_) | Self::ProtocolViolation(_) => 400,
            Self::AuthInvalid(_) => 403,
            Self::UnknownApplication(_) | Self::SocketNotFound(_) => 404,
        }
    }
}

impl From<BrokerError> for AppError {
    fn from(err: BrokerError) -> Self {
        let kind = match &err {
            BrokerError::ProtocolViolation(_)
            | BrokerError::AuthMissing(_)
            | BrokerError::Validation(_) => ErrorKind::Validation,
            BrokerError::AuthInvalid(_) => ErrorKind::Authorization,
            BrokerError::UnknownApplication(_) | BrokerError::SocketNotFound(_) => {
                ErrorKind::NotFound
            }
        };
        AppError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BrokerError::AuthMissing("x".into()).status_code(), 400);
        assert_eq!(BrokerError::AuthInvalid("x".into()).status_code(), 403);
        assert_eq!(BrokerError::UnknownApplication("x".into()).status_code(), 404);
    }

    #[test]
    fn test_maps_into_app_error_kind() {
        let err: AppError = BrokerError::AuthInvalid("bad".into()).into();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let err: AppError = BrokerError::UnknownApplication("k".into()).into();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err: AppError = BrokerError::AuthMissing("no header".into()).into();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
