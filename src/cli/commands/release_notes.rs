//! Release notes command
//!
//! Convenience wrapper over the `github_release_notes` task.

use crate::output::{OutputMode, ReleaseNotesResult};
use crate::tasks::{self, TaskContext, TaskOptions};

/// Generate (and optionally publish) release notes for a tag
pub fn release_notes(
    tag: &str,
    last_tag: Option<&str>,
    link_pr: bool,
    publish: bool,
    include_empty: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let ctx = TaskContext::discover()?;

    let mut options = TaskOptions::new();
    options.set("tag", tag);
    if let Some(last) = last_tag {
        options.set("last_tag", last);
    }
    if link_pr {
        options.set("link_pr", "true");
    }
    if publish {
        options.set("publish", "true");
    }
    if include_empty {
        options.set("include_empty", "true");
    }

    let resolved = tasks::resolve(&ctx.project, "github_release_notes")?;
    let outcome = tasks::run_task(resolved, &ctx, &options)?;

    let result = ReleaseNotesResult {
        tag: tag.to_string(),
        notes: outcome.return_values.get("release_notes").cloned().unwrap_or_default(),
        published: publish,
        release_url: outcome.return_values.get("release_url").cloned(),
    };
    result.render(mode);
    Ok(())
}
