// src/batch.rs

//! The batch job: discover packages, analyze every executable, post-process
//! the generated diagrams.

use std::path::Path;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::config::Settings;
use crate::discovery::{find_ros_packages, AmentIndex, Executable, PackageManifest};
use crate::errors::{Result, RosdocError};
use crate::fs::FileSystem;
use crate::launch::{
    generate_launch_analysis_description, node_name_for, AnalysisPlan, LaunchEvent,
    ProcessBackend, Supervisor, EVENT_CHANNEL_CAPACITY,
};
use crate::report::summary::classify;
use crate::report::{post_process_mermaid_md, BatchSummary, ExecutableResult};
use crate::types::ShutdownReason;

/// Shared inputs of a batch run.
pub struct BatchContext<'a> {
    pub fs: &'a dyn FileSystem,
    pub index: &'a AmentIndex,
    pub settings: &'a Settings,
    /// Flips to `true` on Ctrl-C.
    pub interrupt: watch::Receiver<bool>,
}

impl BatchContext<'_> {
    fn interrupted(&self) -> bool {
        *self.interrupt.borrow()
    }

    fn plan_for(&self, package: &str, executable: &Executable, doc_dir: &Path) -> AnalysisPlan {
        generate_launch_analysis_description(
            self.fs,
            package,
            executable,
            doc_dir,
            self.settings.graph_style.as_deref(),
            self.settings.max_duration,
            &self.settings.graph,
        )
    }
}

/// Run the whole batch.
///
/// `make_backend` builds a fresh process backend for every executable,
/// wired to that run's event channel.
///
/// Failures of a single package or executable are logged, recorded in the
/// summary and skipped. Only setup errors and Ctrl-C abort the batch.
pub async fn run_batch<B, F>(ctx: &BatchContext<'_>, mut make_backend: F) -> Result<BatchSummary>
where
    B: ProcessBackend,
    F: FnMut(mpsc::Sender<LaunchEvent>) -> B,
{
    let settings = ctx.settings;
    let packages = find_ros_packages(ctx.fs, &settings.src_path, &settings.discovery)?;
    info!(count = packages.len(), src = ?settings.src_path, "found ROS packages");

    reset_doc_dir(ctx.fs, &settings.doc_path)?;

    let mut summary = BatchSummary {
        packages: packages.len(),
        ..BatchSummary::default()
    };

    for package in &packages {
        let pkg_doc = settings.doc_path.join(&package.name);
        ctx.fs.create_dir_all(&pkg_doc)?;

        let executables = match ctx.index.executables(ctx.fs, &package.name) {
            Ok(executables) => executables,
            Err(err) => {
                warn!(package = %package.name, error = %err, "cannot list executables");
                summary.record_package_failure(&package.name, &err.to_string());
                continue;
            }
        };

        for executable in &executables {
            if ctx.interrupted() {
                return Err(RosdocError::Interrupted);
            }

            let result =
                match analyze_executable(ctx, package, executable, &pkg_doc, &mut make_backend)
                    .await
                {
                    Ok(result) => result,
                    Err(RosdocError::Interrupted) => return Err(RosdocError::Interrupted),
                    Err(err) => {
                        warn!(
                            package = %package.name,
                            executable = %executable.name,
                            error = %err,
                            "analysis failed"
                        );
                        ExecutableResult::Failed(err.to_string())
                    }
                };

            summary.record(&package.name, &executable.name, &result);
        }
    }

    Ok(summary)
}

/// Run and introspect a single ROS executable.
async fn analyze_executable<B, F>(
    ctx: &BatchContext<'_>,
    package: &PackageManifest,
    executable: &Executable,
    pkg_doc: &Path,
    make_backend: &mut F,
) -> Result<ExecutableResult>
where
    B: ProcessBackend,
    F: FnMut(mpsc::Sender<LaunchEvent>) -> B,
{
    info!(
        package = %package.name,
        executable = %executable.name,
        "--- analyzing executable ---"
    );

    let exec_doc = pkg_doc.join(node_name_for(&executable.name));
    ctx.fs.create_dir_all(&exec_doc)?;

    let plan = ctx.plan_for(&package.name, executable, &exec_doc);

    let (tx, rx) = mpsc::channel::<LaunchEvent>(EVENT_CHANNEL_CAPACITY);
    let backend = make_backend(tx.clone());
    let report = Supervisor::new(plan, rx, tx, backend, ctx.interrupt.clone())
        .run()
        .await?;

    if report.reason == ShutdownReason::Interrupted {
        return Err(RosdocError::Interrupted);
    }

    let documented = post_process_mermaid_md(ctx.fs, &exec_doc, &ctx.settings.graph.output_stem)?;
    let capture_ok = report.capture.is_some_and(|o| o.is_success());

    Ok(classify(&report.reason, capture_ok, documented))
}

/// Remove the doc folder and recreate it empty.
fn reset_doc_dir(fs: &dyn FileSystem, doc_path: &Path) -> Result<()> {
    if fs.exists(doc_path) {
        if let Err(err) = fs.remove_dir_all(doc_path) {
            warn!(doc = ?doc_path, error = %err, "could not remove previous documentation");
        }
    }
    fs.create_dir_all(doc_path)?;
    Ok(())
}

/// What the batch would do for one package.
#[derive(Debug, Clone)]
pub struct PackagePlan {
    pub package: PackageManifest,
    /// Error message when the executables could not be listed.
    pub plans: std::result::Result<Vec<AnalysisPlan>, String>,
}

/// Everything the batch would do, without touching the filesystem or
/// starting processes.
pub fn plan_batch(
    fs: &dyn FileSystem,
    index: &AmentIndex,
    settings: &Settings,
) -> Result<Vec<PackagePlan>> {
    let packages = find_ros_packages(fs, &settings.src_path, &settings.discovery)?;

    Ok(packages
        .into_iter()
        .map(|package| {
            let pkg_doc = settings.doc_path.join(&package.name);
            let plans = index
                .executables(fs, &package.name)
                .map(|executables| {
                    executables
                        .iter()
                        .map(|executable| {
                            generate_launch_analysis_description(
                                fs,
                                &package.name,
                                executable,
                                &pkg_doc.join(node_name_for(&executable.name)),
                                settings.graph_style.as_deref(),
                                settings.max_duration,
                                &settings.graph,
                            )
                        })
                        .collect()
                })
                .map_err(|err| err.to_string());
            PackagePlan { package, plans }
        })
        .collect())
}
