//! Sequential fleet command runner.
//!
//! One external command per project, executed in discovery order with the
//! project directory as working directory and stdio inherited, so the child's
//! output streams straight to the operator. Projects without a `package.json`
//! are reported as skipped rather than dropped from the report.

use std::process::Command;

use flotilla_core::{discover, FleetConfig, FleetProject, ProjectName};

use crate::error::RunError;

// ---------------------------------------------------------------------------
// Command template
// ---------------------------------------------------------------------------

/// The command executed once per project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        CommandTemplate {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    /// Human-readable rendering for log lines and reports.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

// ---------------------------------------------------------------------------
// Run policy
// ---------------------------------------------------------------------------

/// What happens to the rest of the fleet after one project fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Record the failure and keep going.
    #[default]
    ContinueOnError,
    /// Stop at the first failure; later projects are not visited.
    FailFast,
}

/// Verdict of a pre-run hook for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookDecision {
    Run,
    Skip(String),
}

type BeforeHook<'a> =
    &'a dyn Fn(&FleetProject) -> Result<HookDecision, Box<dyn std::error::Error + Send + Sync>>;
type AfterHook<'a> =
    &'a dyn Fn(&FleetProject) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Per-run knobs. `before` can veto a project (extra preconditions beyond the
/// manifest check), `after` runs once the project's command succeeded.
#[derive(Default)]
pub struct RunOptions<'a> {
    pub failure_mode: FailureMode,
    pub before: Option<BeforeHook<'a>>,
    pub after: Option<AfterHook<'a>>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Terminal state of one project within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Succeeded,
    /// Non-zero exit, spawn failure (`code: None`), or kill by signal.
    Failed { code: Option<i32> },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    pub name: ProjectName,
    pub status: ProjectStatus,
}

/// Everything a run did, in fleet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetRunReport {
    pub outcomes: Vec<ProjectOutcome>,
}

impl FleetRunReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, ProjectStatus::Succeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ProjectStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ProjectStatus::Skipped { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&ProjectStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Run `command` once per discovered project, sequentially.
///
/// Discovery happens fresh at call time and does not require a manifest;
/// manifest-less directories show up in the report as skipped. Only
/// infrastructure problems (fleet root missing, hook errors) abort the run —
/// a failing project command is policy, not an error.
pub fn run_across_fleet(
    config: &FleetConfig,
    command: &CommandTemplate,
    options: &RunOptions<'_>,
) -> Result<FleetRunReport, RunError> {
    let projects = discover(config, false)?;
    let mut report = FleetRunReport::default();

    for project in projects {
        let status = run_one(&project, command, options)?;
        let failed = matches!(status, ProjectStatus::Failed { .. });
        report.outcomes.push(ProjectOutcome {
            name: project.name.clone(),
            status,
        });

        if failed && options.failure_mode == FailureMode::FailFast {
            log::warn!("fail-fast: stopping after '{}'", project.name);
            break;
        }
    }

    Ok(report)
}

fn run_one(
    project: &FleetProject,
    command: &CommandTemplate,
    options: &RunOptions<'_>,
) -> Result<ProjectStatus, RunError> {
    if !project.has_manifest() {
        log::info!("skipping '{}': no package.json", project.name);
        return Ok(ProjectStatus::Skipped {
            reason: "no package.json".to_owned(),
        });
    }

    if let Some(before) = options.before {
        match before(project).map_err(|source| RunError::Hook {
            name: project.name.clone(),
            source,
        })? {
            HookDecision::Run => {}
            HookDecision::Skip(reason) => {
                log::info!("skipping '{}': {reason}", project.name);
                return Ok(ProjectStatus::Skipped { reason });
            }
        }
    }

    log::info!("running `{}` in '{}'", command.display(), project.name);
    let status = Command::new(&command.program)
        .args(&command.args)
        .current_dir(&project.path)
        .status();

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            log::error!("failed to spawn `{}`: {e}", command.program);
            return Ok(ProjectStatus::Failed { code: None });
        }
    };

    if !status.success() {
        log::error!("'{}' exited with {status}", project.name);
        return Ok(ProjectStatus::Failed {
            code: status.code(),
        });
    }

    if let Some(after) = options.after {
        after(project).map_err(|source| RunError::Hook {
            name: project.name.clone(),
            source,
        })?;
    }

    Ok(ProjectStatus::Succeeded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn fleet(projects: &[(&str, bool)]) -> (TempDir, FleetConfig) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("microservices");
        for (name, with_manifest) in projects {
            let dir = root.join(name);
            fs::create_dir_all(&dir).unwrap();
            if *with_manifest {
                fs::write(dir.join("package.json"), "{}\n").unwrap();
            }
        }
        let cfg = FleetConfig::new(&root);
        (tmp, cfg)
    }

    fn statuses(report: &FleetRunReport) -> Vec<(&str, &ProjectStatus)> {
        report
            .outcomes
            .iter()
            .map(|o| (o.name.0.as_str(), &o.status))
            .collect()
    }

    #[cfg(unix)]
    fn sh(script: &str) -> CommandTemplate {
        CommandTemplate::new("sh", &["-c", script])
    }

    #[test]
    #[cfg(unix)]
    fn runs_in_each_project_directory() {
        let (_tmp, cfg) = fleet(&[("alpha", true), ("beta", true)]);

        let report =
            run_across_fleet(&cfg, &sh("touch ran.txt"), &RunOptions::default()).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert!(cfg.fleet_root.join("alpha/ran.txt").exists());
        assert!(cfg.fleet_root.join("beta/ran.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn manifest_less_directories_are_skipped() {
        let (_tmp, cfg) = fleet(&[("alpha", true), ("stale", false)]);

        let report = run_across_fleet(&cfg, &sh("true"), &RunOptions::default()).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(statuses(&report)
            .iter()
            .any(|(n, s)| *n == "stale" && matches!(s, ProjectStatus::Skipped { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn continue_on_error_visits_every_project() {
        let (_tmp, cfg) = fleet(&[("alpha", true), ("broken", true), ("omega", true)]);

        let report = run_across_fleet(
            &cfg,
            &sh("test $(basename $PWD) != broken"),
            &RunOptions::default(),
        )
        .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 2);
        assert!(report.has_failures());
    }

    #[test]
    #[cfg(unix)]
    fn fail_fast_stops_at_first_failure() {
        let (_tmp, cfg) = fleet(&[("alpha", true), ("broken", true), ("omega", true)]);

        let report = run_across_fleet(
            &cfg,
            &sh("test $(basename $PWD) != broken"),
            &RunOptions {
                failure_mode: FailureMode::FailFast,
                ..RunOptions::default()
            },
        )
        .unwrap();

        assert_eq!(statuses(&report).len(), 2, "omega must not be visited");
        assert!(matches!(
            report.outcomes.last().map(|o| &o.status),
            Some(ProjectStatus::Failed { code: Some(1) })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn unspawnable_program_is_a_failure_not_an_abort() {
        let (_tmp, cfg) = fleet(&[("alpha", true)]);

        let report = run_across_fleet(
            &cfg,
            &CommandTemplate::new("flotilla-no-such-binary", &[]),
            &RunOptions::default(),
        )
        .unwrap();

        assert!(matches!(
            statuses(&report)[0].1,
            ProjectStatus::Failed { code: None }
        ));
    }

    #[test]
    #[cfg(unix)]
    fn before_hook_can_skip_a_project() {
        let (_tmp, cfg) = fleet(&[("alpha", true), ("beta", true)]);

        let before = |project: &FleetProject| {
            if project.name.0 == "beta" {
                Ok(HookDecision::Skip("held back".to_owned()))
            } else {
                Ok(HookDecision::Run)
            }
        };
        let report = run_across_fleet(
            &cfg,
            &sh("touch ran.txt"),
            &RunOptions {
                before: Some(&before),
                ..RunOptions::default()
            },
        )
        .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!cfg.fleet_root.join("beta/ran.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn after_hook_runs_only_on_success() {
        let (_tmp, cfg) = fleet(&[("alpha", true), ("broken", true)]);

        let after = |project: &FleetProject| {
            fs::write(project.path.join("post.txt"), "done\n")
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        };
        let report = run_across_fleet(
            &cfg,
            &sh("test $(basename $PWD) != broken"),
            &RunOptions {
                after: Some(&after),
                ..RunOptions::default()
            },
        )
        .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(cfg.fleet_root.join("alpha/post.txt").exists());
        assert!(!cfg.fleet_root.join("broken/post.txt").exists());
    }

    #[test]
    fn missing_fleet_root_aborts_the_run() {
        let tmp = TempDir::new().unwrap();
        let cfg = FleetConfig::new(tmp.path().join("nope"));

        let err = run_across_fleet(
            &cfg,
            &CommandTemplate::new("true", &[]),
            &RunOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Core(_)));
    }
}
