use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::status_matrix::StatusMatrix;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const GIT_DIR_NAME: &str = ".git";
const GITDIR_PREFIX: &str = "gitdir:";

/// A repository opened read-only: its working tree, git directory and index snapshot
#[derive(Debug)]
pub struct Repository {
    path: Box<Path>,
    index: Index,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open the repository whose working tree contains `directory`
    ///
    /// Like git, the directory and then its ancestors are searched for `.git`, either a
    /// directory or a file holding `gitdir: <path>` (linked worktrees and submodules).
    pub fn discover(directory: &Path) -> anyhow::Result<Self> {
        let directory = directory
            .canonicalize()
            .with_context(|| format!("Unable to access {}", directory.display()))?;

        for candidate in directory.ancestors() {
            let dot_git = candidate.join(GIT_DIR_NAME);
            if dot_git.is_dir() {
                return Self::open(candidate, &dot_git);
            }
            if dot_git.is_file() {
                let git_path = Self::read_gitdir_file(&dot_git)?;
                return Self::open(candidate, &git_path);
            }
        }

        anyhow::bail!(
            "{} is not inside a git repository",
            directory.display()
        )
    }

    fn read_gitdir_file(dot_git: &Path) -> anyhow::Result<PathBuf> {
        let content = std::fs::read_to_string(dot_git)
            .with_context(|| format!("Unable to read {}", dot_git.display()))?;
        let target = content
            .lines()
            .find_map(|line| line.strip_prefix(GITDIR_PREFIX))
            .map(str::trim)
            .with_context(|| format!("{} does not name a git directory", dot_git.display()))?;

        let base = dot_git.parent().unwrap_or(Path::new("."));
        Ok(base.join(target))
    }

    fn open(path: &Path, git_path: &Path) -> anyhow::Result<Self> {
        let git_path = git_path
            .canonicalize()
            .with_context(|| format!("Unable to access git directory {}", git_path.display()))?;

        // linked worktrees share objects and refs with the main git directory
        let common_path = match std::fs::read_to_string(git_path.join("commondir")) {
            Ok(common_dir) => git_path
                .join(common_dir.trim())
                .canonicalize()
                .context("Unable to access the common git directory")?,
            Err(_) => git_path.clone(),
        };

        let mut index = Index::new(git_path.join("index").into_boxed_path());
        index.rehydrate()?;
        let database = Database::open(common_path.join("objects").into_boxed_path())?;
        let workspace = Workspace::new(path.to_path_buf().into_boxed_path());
        let refs = Refs::new(
            git_path.clone().into_boxed_path(),
            common_path.into_boxed_path(),
        );

        tracing::debug!(
            workdir = %path.display(),
            git_dir = %git_path.display(),
            "opened repository"
        );

        Ok(Repository {
            path: path.to_path_buf().into_boxed_path(),
            index,
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Resolve a revision and peel it to the commit it names
    pub fn resolve_commit(&self, revision: &str) -> anyhow::Result<(ObjectId, Commit)> {
        let oid = self
            .refs
            .resolve(revision)?
            .with_context(|| format!("Unknown revision {revision:?}"))?;

        self.database
            .peel_to_commit(&oid)
            .with_context(|| format!("Revision {revision:?} does not name a commit"))
    }

    /// Every file of the commit's tree keyed by its `/`-separated path
    pub fn head_tree(&self, commit: &Commit) -> anyhow::Result<BTreeMap<String, DatabaseEntry>> {
        self.database
            .flatten_tree(commit.tree_oid())
            .with_context(|| format!("Unable to read tree {}", commit.tree_oid()))
    }

    pub fn status_matrix<'r>(
        &'r self,
        head: &'r BTreeMap<String, DatabaseEntry>,
    ) -> StatusMatrix<'r> {
        StatusMatrix::new(self, head)
    }
}
