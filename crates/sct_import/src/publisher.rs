//! Publishing version sources to source-control repositories.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs_extra::dir::CopyOptions;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{ImportError, ImportResult};

/// Branch pushed without creating it first.
pub const DEFAULT_BRANCH: &str = "master";

const COMMIT_MESSAGE: &str = "initial add";

/// One version's sources to publish to a repository branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub repository_name: String,
    pub branch_name: String,
    /// Directory whose contents become the branch contents
    pub source_dir: PathBuf,
}

/// Publishes version sources into a repository.
#[async_trait]
pub trait RepoPublisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> ImportResult<()>;
}

/// Publisher for AWS CodeCommit through the `aws` and `git` CLIs.
#[derive(Debug, Clone)]
pub struct CodeCommitPublisher {
    region: String,
    workdir: PathBuf,
}

impl CodeCommitPublisher {
    /// Create a publisher cloning into `workdir`.
    pub fn new(region: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            region: region.into(),
            workdir: workdir.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// HTTPS clone URL of a repository.
    pub fn clone_url(&self, repository_name: &str) -> String {
        format!(
            "https://git-codecommit.{}.amazonaws.com/v1/repos/{}",
            self.region, repository_name
        )
    }

    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> ImportResult<String> {
        let command = format!("{} {}", program, args.join(" "));
        debug!("Running `{}` in {:?}", command, cwd);

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| ImportError::Command {
                command: command.clone(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ImportError::Command {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn git(&self, args: &[&str], repo: &Path) -> ImportResult<String> {
        self.run("git", args, repo).await
    }
}

/// Remove everything in a clone except its `.git` directory.
fn clear_working_tree(repo: &Path) -> ImportResult<()> {
    for entry in fs::read_dir(repo)? {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Copy the contents of `source` into `target`.
fn copy_sources(source: &Path, target: &Path) -> ImportResult<()> {
    let mut options = CopyOptions::new();
    options.content_only = true;
    options.overwrite = true;
    fs_extra::dir::copy(source, target, &options)?;
    Ok(())
}

#[async_trait]
impl RepoPublisher for CodeCommitPublisher {
    async fn publish(&self, request: &PublishRequest) -> ImportResult<()> {
        let repository = request.repository_name.as_str();
        let branch = request.branch_name.as_str();
        info!("Publishing {:?} to {}@{}", request.source_dir, repository, branch);

        fs::create_dir_all(&self.workdir)?;
        if let Err(e) = self
            .run(
                "aws",
                &[
                    "codecommit",
                    "create-repository",
                    "--repository-name",
                    repository,
                    "--region",
                    self.region.as_str(),
                ],
                &self.workdir,
            )
            .await
        {
            warn!("Could not create repository {} (it may already exist): {}", repository, e);
        }

        let clone_dir = self.workdir.join(repository);
        if clone_dir.exists() {
            fs::remove_dir_all(&clone_dir)?;
        }
        let url = self.clone_url(repository);
        self.git(
            &[
                "clone",
                "--config",
                "credential.helper=!aws codecommit credential-helper $@",
                "--config",
                "credential.UseHttpPath=true",
                url.as_str(),
                repository,
            ],
            &self.workdir,
        )
        .await?;

        clear_working_tree(&clone_dir)?;
        copy_sources(&request.source_dir, &clone_dir)?;

        if branch != DEFAULT_BRANCH {
            self.git(&["checkout", "-b", branch], &clone_dir).await?;
        }
        self.git(&["add", "--all", "."], &clone_dir).await?;

        let status = self.git(&["status", "--porcelain"], &clone_dir).await?;
        if status.trim().is_empty() {
            info!("No changes for {}@{}", repository, branch);
        } else {
            self.git(&["commit", "-m", COMMIT_MESSAGE], &clone_dir).await?;
            if branch == DEFAULT_BRANCH {
                self.git(&["push"], &clone_dir).await?;
            } else {
                self.git(&["push", "--set-upstream", "origin", branch], &clone_dir)
                    .await?;
            }
        }

        fs::remove_dir_all(&clone_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clone_url() {
        let publisher = CodeCommitPublisher::new("eu-west-1", "/tmp");
        assert_eq!(
            publisher.clone_url("vpc"),
            "https://git-codecommit.eu-west-1.amazonaws.com/v1/repos/vpc"
        );
    }

    #[test]
    fn test_clear_working_tree_keeps_git() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git").join("refs")).unwrap();
        fs::create_dir_all(dir.path().join("old")).unwrap();
        fs::write(dir.path().join("old").join("file.txt"), "x").unwrap();
        fs::write(dir.path().join("README.md"), "x").unwrap();

        clear_working_tree(dir.path()).unwrap();

        let remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(remaining, vec![".git"]);
    }

    #[test]
    fn test_copy_sources_content_only() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::create_dir_all(source.path().join("nested")).unwrap();
        fs::write(source.path().join("product.template.yaml"), "Description: x\n").unwrap();
        fs::write(source.path().join("nested").join("a.txt"), "a").unwrap();

        copy_sources(source.path(), target.path()).unwrap();

        assert!(target.path().join("product.template.yaml").is_file());
        assert!(target.path().join("nested").join("a.txt").is_file());
    }

    #[tokio::test]
    async fn test_run_reports_failure() {
        let dir = tempdir().unwrap();
        let publisher = CodeCommitPublisher::new("eu-west-1", dir.path());
        let err = publisher
            .run("git", &["not-a-real-subcommand"], dir.path())
            .await;
        assert!(matches!(err, Err(ImportError::Command { .. })));
    }
}
