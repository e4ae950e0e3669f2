//! Top-level orchestration: wires the Snapshot Builder through the Emitter
//! into one `run()` call.

use crate::config::Config;
use crate::emit::{self, EmitResult};
use crate::error::MigrationResult;
use crate::prompt::Prompter;
use crate::render::{Formatter, MigrationRenderer, NoopFormatter, PostgresRenderer};
use crate::resource::{RepoConfig, ResourceHandle};
use crate::snapshot::{builder, merge};
use crate::{diff, order, phase, streamline};
use std::path::PathBuf;

/// The result of one pipeline run. `NoChanges` is not an error (§7): the
/// caller is expected to print an informational message and exit cleanly.
pub enum Outcome {
    NoChanges,
    Written { migration_path: PathBuf, module_name: String },
}

/// Runs the full pipeline over every resource belonging to one repo.
pub fn run(
    resources: &[&dyn ResourceHandle],
    repo_config: &dyn RepoConfig,
    config: &Config,
    prompter: &mut dyn Prompter,
) -> MigrationResult<Outcome> {
    run_with_renderer(resources, repo_config, config, prompter, &PostgresRenderer)
}

pub fn run_with_renderer(
    resources: &[&dyn ResourceHandle],
    repo_config: &dyn RepoConfig,
    config: &Config,
    prompter: &mut dyn Prompter,
    renderer: &dyn MigrationRenderer,
) -> MigrationResult<Outcome> {
    if resources.is_empty() {
        return Ok(Outcome::NoChanges);
    }

    let mut fresh = Vec::with_capacity(resources.len());
    for resource in resources {
        fresh.push(builder::build(*resource, repo_config)?);
    }
    let repo_last_segment = fresh[0].repo.last_segment().to_owned();
    tracing::debug!(count = fresh.len(), repo = %repo_last_segment, "built fresh snapshots");

    let merged_pairs = merge::merge_all(config.snapshot_dir(), fresh, prompter)?;
    tracing::debug!(tables = merged_pairs.len(), "merged snapshots across declarations");

    let mut all_ops = Vec::new();
    let mut merged_snapshots = Vec::with_capacity(merged_pairs.len());
    for (merged, existing) in &merged_pairs {
        let ops = diff::diff(merged, existing.as_ref(), prompter)?;
        all_ops.extend(ops);
        merged_snapshots.push(merged.clone());
    }

    if all_ops.is_empty() {
        tracing::info!("no schema changes detected");
        return Ok(Outcome::NoChanges);
    }
    tracing::debug!(count = all_ops.len(), "computed raw operations");

    let ordered = order::order(all_ops);
    let streamlined = streamline::streamline(ordered);
    let phases = phase::phase(streamlined);
    tracing::debug!(phases = phases.len(), "grouped operations into phases");

    let formatter: Option<&dyn Formatter> = config.format.then_some(&NoopFormatter as &dyn Formatter);

    let EmitResult { migration_path, module_name } = emit::emit(
        config.snapshot_dir(),
        &config.migration_dir(),
        &repo_last_segment,
        &phases,
        &merged_snapshots,
        renderer,
        formatter,
    )?;
    tracing::info!(path = %migration_path.display(), "wrote migration");

    Ok(Outcome::Written { migration_path, module_name })
}
