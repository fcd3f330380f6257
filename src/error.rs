// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

use thiserror::Error;

use crate::kubernetes::is_not_found;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("failed to convert object: {0}")]
    Conversion(#[from] serde_json::Error),

    #[error("failed to render yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse {kind} {name:?}: {message}")]
    Parse {
        kind: String,
        name: String,
        message: String,
    },

    #[error("{kind} has no name")]
    MissingName { kind: String },

    #[error("{kind} {name:?} not found")]
    NotFound { kind: String, name: String },

    #[error("delete {kind} {name:?}: {source}")]
    Delete {
        kind: String,
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("wait for {kind} {name:?} deleted: {source}")]
    WaitDeleted {
        kind: String,
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("wait for {kind} {name:?} condition {condition}: {source}")]
    WaitCondition {
        kind: String,
        name: String,
        condition: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Teardown(#[from] TeardownError),

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("found no {kind}s to delete")]
    NothingToDelete { kind: String },
}

impl Error {
    /// True when the remote system explicitly reported the object as absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Kube(e) => is_not_found(e),
            Error::NotFound { .. } => true,
            _ => false,
        }
    }

    /// True when the error came from the local context rather than the cluster.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Error::Cancelled | Error::DeadlineExceeded => true,
            Error::Delete { source, .. }
            | Error::WaitDeleted { source, .. }
            | Error::WaitCondition { source, .. } => source.is_cancellation(),
            Error::Teardown(teardown) => teardown.errors().iter().any(Error::is_cancellation),
            _ => false,
        }
    }
}

/// Every per-object failure of a teardown, in the order the objects were given.
#[derive(Debug)]
pub struct TeardownError {
    errors: Vec<Error>,
}

impl TeardownError {
    /// Returns `None` when there is nothing to report.
    pub fn from_errors(errors: Vec<Error>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for TeardownError {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_error_joins_messages_in_order() {
        let err = TeardownError::from_errors(vec![
            Error::Delete {
                kind: "clustercatalog".to_string(),
                name: "a".to_string(),
                source: Box::new(Error::Cancelled),
            },
            Error::WaitDeleted {
                kind: "clusterextension".to_string(),
                name: "b".to_string(),
                source: Box::new(Error::DeadlineExceeded),
            },
        ])
        .unwrap();

        assert_eq!(
            err.to_string(),
            "delete clustercatalog \"a\": context canceled\nwait for clusterextension \"b\" deleted: context deadline exceeded"
        );
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn test_teardown_error_empty_is_none() {
        assert!(TeardownError::from_errors(Vec::new()).is_none());
    }

    #[test]
    fn test_is_cancellation_looks_through_wrappers() {
        let err = Error::WaitDeleted {
            kind: "clustercatalog".to_string(),
            name: "a".to_string(),
            source: Box::new(Error::DeadlineExceeded),
        };
        assert!(err.is_cancellation());
        assert!(!Error::InvalidArgument("x".to_string()).is_cancellation());
    }

    #[test]
    fn test_is_not_found_for_api_404() {
        let err = Error::Kube(kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        }));
        assert!(err.is_not_found());
        assert!(!Error::Cancelled.is_not_found());
    }
}
