use crate::utils::error::{DrawError, Result};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl Display, reason: impl Into<String>) -> DrawError {
    DrawError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A file we read, such as the roster.
    File,
    /// A directory we may create, such as the draw ledger's state dir.
    Dir,
}

/// Rejects empty paths, NUL bytes, and paths that already exist as the wrong kind.
/// A path that does not exist yet is fine.
pub fn validate_path(field_name: &str, path: &str, kind: PathKind) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path.escape_default(), "Path contains null bytes"));
    }

    let existing = Path::new(path);
    match kind {
        PathKind::File if existing.is_dir() => {
            Err(invalid(field_name, path, "Expected a file, found a directory"))
        }
        PathKind::Dir if existing.exists() && !existing.is_dir() => {
            Err(invalid(field_name, path, "Expected a directory, found a file"))
        }
        _ => Ok(()),
    }
}

pub fn validate_at_least(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Fails on the first value seen twice.
pub fn validate_unique<'a, T>(field_name: &str, values: impl IntoIterator<Item = &'a T>) -> Result<()>
where
    T: Eq + Hash + Display + 'a,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(invalid(field_name, value, "Duplicate value"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_at_least() {
        assert!(validate_at_least("policy.min_participants", 2, 2).is_ok());
        let err = validate_at_least("policy.min_participants", 1, 2).unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("participants.name", "Ana").is_ok());
        assert!(validate_non_empty_string("participants.name", "   ").is_err());
    }

    #[test]
    fn test_validate_unique() {
        let ids = vec![1, 2, 3];
        assert!(validate_unique("groups.participants", &ids).is_ok());

        let dupes = vec![1, 2, 1];
        let err = validate_unique("groups.participants", &dupes).unwrap_err();
        assert!(err.to_string().contains("groups.participants"));
    }

    #[test]
    fn test_validate_path_rejects_blank_and_nul() {
        assert!(validate_path("state_dir", "./state", PathKind::Dir).is_ok());
        assert!(validate_path("state_dir", "  ", PathKind::Dir).is_err());
        assert!(validate_path("roster", "bad\0path", PathKind::File).is_err());
    }

    #[test]
    fn test_validate_path_checks_existing_kind() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("roster.toml");
        std::fs::write(&file, "").unwrap();
        let (dir, file) = (dir.path().to_str().unwrap(), file.to_str().unwrap());

        assert!(validate_path("roster", file, PathKind::File).is_ok());
        assert!(validate_path("state_dir", dir, PathKind::Dir).is_ok());

        let err = validate_path("roster", dir, PathKind::File).unwrap_err();
        assert!(err.to_string().contains("roster"));
        assert!(validate_path("state_dir", file, PathKind::Dir).is_err());
    }
}
