use thiserror::Error;

#[derive(Debug, Error)]
pub enum TeamsError {
    #[error("invalid identity '{0}', expected name@team")]
    InvalidIdentity(String),

    #[error("invalid name '{0}': must be non-empty ASCII alphanumeric/hyphen/underscore")]
    InvalidName(String),

    #[error("cross-team messaging not supported ({0} -> {1})")]
    CrossTeam(String, String),

    #[error("{0}")]
    Validation(String),

    #[error("team '{0}' not found")]
    TeamNotFound(String),

    #[error("team '{0}' already exists")]
    TeamExists(String),

    #[error("agent '{0}' is not a member of team '{1}'")]
    MemberNotFound(String, String),

    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("task {id} is {status}, cannot {action}")]
    Conflict {
        id: String,
        status: String,
        action: &'static str,
    },

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("corrupt file '{0}': {1}")]
    Corrupt(String, String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse error taxonomy surfaced to callers that only care about the class
/// of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Io,
}

impl TeamsError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentity(_) => "invalid_identity",
            Self::InvalidName(_) => "invalid_name",
            Self::CrossTeam(_, _) => "cross_team",
            Self::Validation(_) => "validation_error",
            Self::TeamNotFound(_) => "team_not_found",
            Self::TeamExists(_) => "team_exists",
            Self::MemberNotFound(_, _) => "member_not_found",
            Self::TaskNotFound(_) => "task_not_found",
            Self::Conflict { .. } => "conflict",
            Self::Locked(_) => "locked",
            Self::Corrupt(_, _) => "corrupt_file",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentity(_)
            | Self::InvalidName(_)
            | Self::CrossTeam(_, _)
            | Self::Validation(_) => ErrorKind::Validation,
            Self::TeamNotFound(_) | Self::MemberNotFound(_, _) | Self::TaskNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::TeamExists(_) | Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Locked(_) | Self::Corrupt(_, _) | Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, TeamsError>;
