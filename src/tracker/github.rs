//! GitHub tracker: drives issue and label operations through the `gh` CLI.
//!
//! Authentication is whatever `gh` sees (`GH_TOKEN`/`GITHUB_TOKEN` in CI).
//! The same calls work for issues and pull requests.

use std::process::Command;

use serde::Deserialize;

use super::{Tracker, TrackerError};
use crate::model::IssueState;

/// Tracker backed by the `gh` CLI.
#[derive(Debug, Clone, Default)]
pub struct GhTracker {
    /// `owner/repo`. When absent, `gh` infers the repository from the checkout.
    repository: Option<String>,
}

/// JSON shape returned by `gh label list --json name`.
#[derive(Deserialize)]
struct GhLabel {
    name: String,
}

impl GhTracker {
    pub fn new(repository: Option<String>) -> Self {
        Self { repository }
    }

    /// Arguments pinning a `gh issue`/`gh label` command to the repository.
    fn repo_args(&self) -> Vec<&str> {
        match &self.repository {
            Some(repo) => vec!["--repo", repo.as_str()],
            None => Vec::new(),
        }
    }

    /// REST path for an issue, e.g. `repos/owner/repo/issues/42`.
    fn issue_endpoint(&self, number: u64) -> String {
        let repo = self.repository.as_deref().unwrap_or("{owner}/{repo}");
        format!("repos/{repo}/issues/{number}")
    }
}

impl Tracker for GhTracker {
    fn labels(&self) -> Result<Vec<String>, TrackerError> {
        let mut args = vec!["label", "list", "--json", "name", "--limit", "1000"];
        args.extend(self.repo_args());

        let json = run_gh(&args)?;
        let labels: Vec<GhLabel> = serde_json::from_str(&json)?;

        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), TrackerError> {
        let args = label_args(&self.issue_endpoint(number), labels);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        run_gh(&args)?;
        Ok(())
    }

    fn set_state(&self, number: u64, state: IssueState) -> Result<(), TrackerError> {
        // PATCH on the issue endpoint is idempotent, unlike `gh issue close`.
        let endpoint = self.issue_endpoint(number);
        let field = format!("state={state}");

        run_gh(&[
            "api",
            "--method",
            "PATCH",
            endpoint.as_str(),
            "-f",
            field.as_str(),
            "--silent",
        ])?;
        Ok(())
    }

    fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError> {
        let num = number.to_string();
        let mut args = vec!["issue", "comment", num.as_str(), "--body", body];
        args.extend(self.repo_args());

        run_gh(&args)?;
        Ok(())
    }
}

/// `gh api` arguments adding `labels` to an issue.
///
/// One `labels[]` field per label, so names containing commas stay whole.
/// The endpoint only adds; existing labels are kept.
fn label_args(issue_endpoint: &str, labels: &[String]) -> Vec<String> {
    let mut args = vec![
        "api".to_string(),
        "--method".to_string(),
        "POST".to_string(),
        format!("{issue_endpoint}/labels"),
        "--silent".to_string(),
    ];
    for label in labels {
        args.push("-f".to_string());
        args.push(format!("labels[]={label}"));
    }
    args
}

/// Run a gh command and return its stdout on success.
fn run_gh(args: &[&str]) -> Result<String, TrackerError> {
    tracing::debug!(command = %describe(args), "running gh");

    let output = Command::new("gh").args(args).output()?;

    if !output.status.success() {
        return Err(TrackerError::Command {
            command: describe(args),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// The subcommand words of a gh invocation, without flags or values.
///
/// Keeps comment bodies out of logs and error messages.
fn describe(args: &[&str]) -> String {
    args.iter()
        .take_while(|a| !a.starts_with('-'))
        .take(2)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
