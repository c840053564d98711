use skilldeck_common::FromMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "file-watcher")]
    #[error(transparent)]
    Notify(#[from] notify_debouncer_full::notify::Error),
    #[error("skill '{directory_name}' is not installed")]
    SkillNotFound { directory_name: String },
    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn skill_not_found(directory_name: impl Into<String>) -> Self {
        Self::SkillNotFound {
            directory_name: directory_name.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

skilldeck_common::impl_context!();
