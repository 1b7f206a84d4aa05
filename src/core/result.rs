//! The tri-state result handed from the synchronizer to the rendering layer

use std::fmt::Display;

/// Where a successful result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Network,
    Local,
}

impl Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DataSource::Network => "NETWORK",
                DataSource::Local => "LOCAL",
            }
        )
    }
}

/// Latest state of one feed. Exactly one variant is active at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum UiState<T> {
    Loading,
    Success { data: T, source: DataSource },
    Error { message: String },
}

impl<T> UiState<T> {
    pub fn success(data: T, source: DataSource) -> Self {
        UiState::Success { data, source }
    }

    pub fn error(message: impl Into<String>) -> Self {
        UiState::Error {
            message: message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn source(&self) -> Option<DataSource> {
        match self {
            UiState::Success { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Whether the front end should offer another refresh.
    ///
    /// Live data and in-flight cycles disable it; cached data and errors
    /// enable it so the user can retry.
    pub fn allows_refresh(&self) -> bool {
        match self {
            UiState::Loading => false,
            UiState::Success { source, .. } => *source == DataSource::Local,
            UiState::Error { .. } => true,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> UiState<U> {
        match self {
            UiState::Loading => UiState::Loading,
            UiState::Success { data, source } => UiState::Success {
                data: f(data),
                source,
            },
            UiState::Error { message } => UiState::Error { message },
        }
    }
}
