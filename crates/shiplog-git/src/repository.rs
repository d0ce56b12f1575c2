//! Repository handle

use std::path::{Path, PathBuf};

use git2::{DescribeFormatOptions, DescribeOptions, ErrorCode, Repository};
use tracing::{debug, instrument};

use shiplog_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// An opened repository and its working directory
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository rooted exactly at `path`
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .map_err(|e| open_error(e, GitError::RepositoryNotFound(path.to_path_buf())))?;
        Ok(Self::wrap(repo))
    }

    /// Open the repository containing `start_path`
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        let repo = Repository::discover(start_path)
            .map_err(|e| open_error(e, GitError::NotARepository(start_path.to_path_buf())))?;
        Ok(Self::wrap(repo))
    }

    fn wrap(repo: Repository) -> Self {
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!(path = %path.display(), "repository opened");
        Self { repo, path }
    }

    /// Working directory, or the git dir of a bare repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nearest tag reachable from HEAD, if any
    pub fn latest_tag(&self) -> Result<Option<String>> {
        let mut opts = DescribeOptions::new();
        opts.describe_tags();

        let describe = match self.repo.describe(&opts) {
            Ok(d) => d,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);
        let tag = describe.format(Some(&format))?;
        debug!(tag = %tag, "latest tag");
        Ok(Some(tag))
    }
}

fn open_error(err: git2::Error, missing: GitError) -> GitError {
    if err.code() == ErrorCode::NotFound {
        missing
    } else {
        GitError::OpenFailed(err.to_string())
    }
}
