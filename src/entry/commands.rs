use std::time::Duration;

use tracing::{info, warn};

use restbench::args::{CaseArgs, LoadArgs, MonitorArgs, SuiteArgs};
use restbench::config::Plan;
use restbench::domain::{LoadTestConfig, MonitorConfig, TestSuite};
use restbench::error::{AppError, AppResult, ConfigError};
use restbench::monitor::MonitorService;
use restbench::report::{MonitorReport, Report};
use restbench::workbench::Workbench;

/// Load test length when neither the plan nor the CLI sets one.
const DEFAULT_LOAD_DURATION: Duration = Duration::from_secs(30);
const MONITOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A report to print plus the command's final verdict. Failing runs still
/// print their results before the error surfaces.
pub(crate) type CommandOutcome = (Report, AppResult<()>);

pub(crate) async fn run_suites(
    workbench: &Workbench,
    plan: &Plan,
    args: &SuiteArgs,
) -> AppResult<CommandOutcome> {
    let suites: Vec<&TestSuite> = match args.name.as_deref() {
        Some(name) => vec![plan.suite(name)?],
        None => plan.suites.iter().collect(),
    };
    if suites.is_empty() {
        return Err(AppError::config(ConfigError::EmptySection { section: "suites" }));
    }

    let mut results = Vec::with_capacity(suites.len());
    for suite in suites {
        results.push(workbench.run_test_suite(suite).await?);
    }

    let outcome = results
        .iter()
        .find(|result| result.failed > 0)
        .map_or(Ok(()), |result| {
            Err(AppError::SuiteFailed {
                suite: result.suite_id.clone(),
                failed: result.failed,
                total: result.total,
            })
        });
    Ok((Report::Suites(results), outcome))
}

pub(crate) async fn run_case(
    workbench: &Workbench,
    plan: &Plan,
    args: &CaseArgs,
) -> AppResult<CommandOutcome> {
    let (case, variables) = plan.case(&args.id, args.suite.as_deref())?;
    let result = workbench.run_test_case(case, variables).await;
    let outcome = if result.status.is_failure() {
        Err(AppError::CaseFailed {
            case: result.test_case_id.clone(),
            status: result.status.as_str(),
        })
    } else {
        Ok(())
    };
    Ok((Report::Case(Box::new(result)), outcome))
}

pub(crate) async fn run_load(
    workbench: &Workbench,
    plan: &Plan,
    args: &LoadArgs,
) -> AppResult<CommandOutcome> {
    let config = load_config(plan, args)?;
    info!(
        "Load test '{}': {} user(s) for {}s",
        config.test_case.name,
        config.max_users,
        config.duration.as_secs()
    );
    let result = workbench.run_load_test(&config).await?;
    Ok((Report::Load(Box::new(result)), Ok(())))
}

/// Plan load settings with CLI overrides applied on top.
pub(crate) fn load_config(plan: &Plan, args: &LoadArgs) -> AppResult<LoadTestConfig> {
    let mut config = match (args.case.as_deref(), plan.load.clone()) {
        (Some(id), Some(mut config)) => {
            config.test_case = plan.case(id, None)?.0.clone();
            config
        }
        (Some(id), None) => {
            LoadTestConfig::new(plan.case(id, None)?.0.clone(), DEFAULT_LOAD_DURATION, 1)
        }
        (None, Some(config)) => config,
        (None, None) => return Err(AppError::config(ConfigError::MissingLoadSection)),
    };
    if let Some(duration) = args.duration {
        config.duration = duration;
    }
    if let Some(ramp_up) = args.ramp_up {
        config.ramp_up = ramp_up;
    }
    if let Some(users) = args.users {
        config.max_users = users.get();
    }
    if let Some(rps) = args.rps {
        config.requests_per_sec = rps.get();
    }
    Ok(config)
}

pub(crate) async fn run_monitors(
    workbench: &Workbench,
    plan: &Plan,
    args: &MonitorArgs,
) -> AppResult<CommandOutcome> {
    let configs: Vec<&MonitorConfig> = match args.name.as_deref() {
        Some(name) => vec![plan.monitor(name)?],
        None => plan.monitors.iter().filter(|config| config.enabled).collect(),
    };
    if configs.is_empty() {
        return Err(AppError::config(ConfigError::EmptySection { section: "monitors" }));
    }

    let service = workbench.monitor_service();
    for config in &configs {
        service.start((*config).clone())?;
    }

    let waited = wait_for_checks(&service, &configs, args.checks.map(|checks| checks.get())).await;
    service.stop_all();
    waited?;

    let mut reports = Vec::with_capacity(configs.len());
    for config in configs {
        reports.push(MonitorReport {
            stats: service.stats(&config.id)?,
            uptime: service.uptime_report(&config.id, args.period)?,
            alerts: service.alerts(&config.id)?,
        });
    }
    Ok((Report::Monitors(reports), Ok(())))
}

/// Returns once every monitor has `checks` results, or on Ctrl-C.
async fn wait_for_checks(
    service: &MonitorService,
    configs: &[&MonitorConfig],
    checks: Option<usize>,
) -> AppResult<()> {
    let Some(target) = checks else {
        info!("Monitoring {} endpoint(s); press Ctrl-C to stop", configs.len());
        tokio::signal::ctrl_c().await?;
        return Ok(());
    };
    let target = u64::try_from(target).unwrap_or(u64::MAX);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(MONITOR_POLL_INTERVAL);
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(err) = result {
                    warn!("Failed to listen for Ctrl-C: {}", err);
                }
                return Ok(());
            }
            _ = poll.tick() => {
                let mut done = true;
                for config in configs {
                    if service.stats(&config.id)?.total_checks < target {
                        done = false;
                        break;
                    }
                }
                if done {
                    return Ok(());
                }
            }
        }
    }
}
