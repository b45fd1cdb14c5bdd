use crate::error::{Result, TeamsError};

/// An agent reference of the form `name@team`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub name: String,
    pub team: String,
}

impl Identity {
    /// Split on the first `@`. Both halves must be valid names.
    pub fn parse(input: &str) -> Result<Self> {
        let Some((name, team)) = input.split_once('@') else {
            return Err(TeamsError::InvalidIdentity(input.into()));
        };
        if validate_name(name).is_err() || validate_name(team).is_err() {
            return Err(TeamsError::InvalidIdentity(input.into()));
        }
        Ok(Self {
            name: name.into(),
            team: team.into(),
        })
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.team)
    }
}

/// Team and member names become path components, so they are restricted to
/// ASCII alphanumerics, hyphen and underscore.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TeamsError::InvalidName(name.into()));
    }
    Ok(())
}
