//! Input parsing for repository pairs.
//!
//! Each input line is either `dstOrg/repo`, where the source org is the
//! destination org without its prefix, or `srcOrg/srcRepo,dstOrg/dstRepo`.
//! Blank lines and lines starting with `#` are ignored.

mod error;
mod repository;

pub use error::PairError;
pub use repository::{Repository, RepositoryPair};

/// Returns true for lines that carry no pair.
#[must_use]
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parses one input line into a repository pair.
///
/// # Errors
///
/// Returns [`PairError`] when the line is malformed or, for a
/// destination-only line, the org does not carry `destination_org_prefix`.
pub fn parse_pair(line: &str, destination_org_prefix: &str) -> Result<RepositoryPair, PairError> {
    let line = line.trim();

    if let Some((source, destination)) = line.split_once(',') {
        return Ok(RepositoryPair {
            source: parse_repository(line, source)?,
            destination: parse_repository(line, destination)?,
        });
    }

    let destination = parse_repository(line, line)?;
    let source_org = destination
        .owner
        .strip_prefix(destination_org_prefix)
        .filter(|org| !org.is_empty())
        .ok_or_else(|| PairError::MissingPrefix {
            org: destination.owner.clone(),
            prefix: destination_org_prefix.to_string(),
        })?;

    Ok(RepositoryPair {
        source: Repository::new(source_org, destination.name.clone()),
        destination,
    })
}

fn parse_repository(line: &str, text: &str) -> Result<Repository, PairError> {
    let invalid = |reason: &str| PairError::Invalid {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let (owner, name) = text
        .trim()
        .split_once('/')
        .ok_or_else(|| invalid("missing '/'"))?;

    if owner.is_empty() || !owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid("org may only contain letters, digits and '-'"));
    }
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("repository may only contain letters, digits, '-', '_' and '.'"));
    }

    Ok(Repository::new(owner, name))
}
