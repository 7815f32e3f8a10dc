//! Pipeline context detected from the GitHub Actions runner environment.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use versioner_domain::Metadata;

pub const SOURCE_SYSTEM: &str = "github";
const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Facts about the running workflow. Everything is optional so the tracker
/// can run outside a runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineContext {
    /// `owner/repo`
    pub repository: Option<String>,
    pub sha: Option<String>,
    pub branch: Option<String>,
    pub git_ref: Option<String>,
    pub run_number: Option<String>,
    pub run_id: Option<String>,
    pub run_attempt: Option<String>,
    pub build_url: Option<String>,
    pub actor: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub workflow: Option<String>,
    pub job: Option<String>,
    pub event_name: Option<String>,
}

impl PipelineContext {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let repository = get("GITHUB_REPOSITORY");
        let run_id = get("GITHUB_RUN_ID");
        let build_url = match (&repository, &run_id) {
            (Some(repo), Some(run)) => {
                let server = get("GITHUB_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.into());
                Some(format!(
                    "{}/{repo}/actions/runs/{run}",
                    server.trim_end_matches('/')
                ))
            }
            _ => None,
        };

        let git_ref = get("GITHUB_REF");
        let branch = derive_branch(
            git_ref.as_deref(),
            get("GITHUB_HEAD_REF").as_deref(),
            get("GITHUB_REF_NAME").as_deref(),
        );

        let (author_name, author_email) = get("GITHUB_EVENT_PATH")
            .map(|path| read_commit_author(Path::new(&path)))
            .unwrap_or_default();

        Self {
            repository,
            sha: get("GITHUB_SHA"),
            branch,
            git_ref,
            run_number: get("GITHUB_RUN_NUMBER"),
            run_id,
            run_attempt: get("GITHUB_RUN_ATTEMPT"),
            build_url,
            actor: get("GITHUB_ACTOR"),
            author_name,
            author_email,
            workflow: get("GITHUB_WORKFLOW"),
            job: get("GITHUB_JOB"),
            event_name: get("GITHUB_EVENT_NAME"),
        }
    }

    /// Repository name without the owner.
    pub fn repository_name(&self) -> Option<&str> {
        let repo = self.repository.as_deref()?;
        let name = repo.rsplit('/').next().unwrap_or(repo);
        (!name.is_empty()).then_some(name)
    }

    /// Workflow facts merged under user metadata.
    pub fn detected_metadata(&self) -> Metadata {
        [
            ("github_workflow", &self.workflow),
            ("github_job", &self.job),
            ("github_event_name", &self.event_name),
            ("github_run_attempt", &self.run_attempt),
            ("github_ref", &self.git_ref),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| (key.to_string(), Value::String(v.clone())))
        })
        .collect()
    }
}

fn derive_branch(git_ref: Option<&str>, head_ref: Option<&str>, ref_name: Option<&str>) -> Option<String> {
    if let Some(branch) = git_ref.and_then(|r| r.strip_prefix("refs/heads/")) {
        return Some(branch.to_string());
    }
    // Pull request refs look like refs/pull/42/merge.
    head_ref.or(ref_name).map(str::to_string)
}

/// Commit author from `head_commit.author` in the event payload file.
fn read_commit_author(path: &Path) -> (Option<String>, Option<String>) {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not read GitHub event file");
            return (None, None);
        }
    };
    let event: Value = match serde_json::from_str(&contents) {
        Ok(event) => event,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "GitHub event file is not valid JSON");
            return (None, None);
        }
    };

    let author = &event["head_commit"]["author"];
    let field = |key: &str| {
        author
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    (field("name"), field("email"))
}
