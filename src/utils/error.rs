use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawError {
    /// Group, draw or participant is absent, or the caller may not see it.
    /// Carries no detail so callers cannot tell which case applied.
    #[error("Resource not found")]
    NotFound,

    #[error("Only the group owner can run the draw")]
    Forbidden,

    #[error("Draw already done for group {group_id}")]
    AlreadyDrawn { group_id: String },

    #[error("Invalid participant count {count}: {reason}")]
    InvalidParticipantCount { count: usize, reason: String },

    #[error("Participant {participant_id} appears more than once")]
    DuplicateParticipant { participant_id: String },

    #[error("Participant {participant_id} is already a member of group {group_id}")]
    AlreadyMember {
        participant_id: String,
        group_id: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    AlreadyDrawn,
    InvalidParticipantCount,
    Conflict,
    Configuration,
    Infrastructure,
}

impl DrawError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrawError::NotFound => ErrorKind::NotFound,
            DrawError::Forbidden => ErrorKind::Forbidden,
            DrawError::AlreadyDrawn { .. } => ErrorKind::AlreadyDrawn,
            DrawError::InvalidParticipantCount { .. } => ErrorKind::InvalidParticipantCount,
            DrawError::DuplicateParticipant { .. } | DrawError::AlreadyMember { .. } => {
                ErrorKind::Conflict
            }
            DrawError::ConfigError { .. } | DrawError::InvalidConfigValueError { .. } => {
                ErrorKind::Configuration
            }
            DrawError::IoError(_)
            | DrawError::SerializationError(_)
            | DrawError::StorageError { .. } => ErrorKind::Infrastructure,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.kind() {
            ErrorKind::NotFound => "Nothing to show here.".to_string(),
            ErrorKind::Forbidden => "Only the group owner can run the draw.".to_string(),
            ErrorKind::AlreadyDrawn => "This group has already been drawn.".to_string(),
            ErrorKind::InvalidParticipantCount | ErrorKind::Conflict => self.to_string(),
            ErrorKind::Configuration => format!("Check your roster file: {}", self),
            ErrorKind::Infrastructure => format!("Storage failure: {}", self),
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Infrastructure => 1,
            ErrorKind::Configuration => 2,
            ErrorKind::Forbidden => 3,
            ErrorKind::NotFound => 4,
            ErrorKind::AlreadyDrawn => 5,
            ErrorKind::InvalidParticipantCount => 6,
            ErrorKind::Conflict => 7,
        }
    }
}

pub type Result<T> = std::result::Result<T, DrawError>;
