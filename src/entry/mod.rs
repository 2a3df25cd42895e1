mod commands;

use std::sync::Arc;

use clap::Parser;

use restbench::args::{BenchArgs, Command, OutputFormat};
use restbench::config::{Plan, load_plan};
use restbench::error::AppResult;
use restbench::http::{ClientSettings, ReqwestExecutor};
use restbench::report::{self, Report};
use restbench::testing::DEFAULT_CASE_TIMEOUT;
use restbench::workbench::Workbench;

pub(crate) fn run() -> AppResult<()> {
    let args = BenchArgs::parse();

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: BenchArgs) -> AppResult<()> {
    let plan = Plan::from_file(&load_plan(args.config.as_deref())?)?;
    let workbench = build_workbench(&args, &plan)?;

    let (report, outcome) = match &args.command {
        Command::Suite(suite_args) => commands::run_suites(&workbench, &plan, suite_args).await?,
        Command::Case(case_args) => commands::run_case(&workbench, &plan, case_args).await?,
        Command::Load(load_args) => commands::run_load(&workbench, &plan, load_args).await?,
        Command::Monitor(monitor_args) => {
            commands::run_monitors(&workbench, &plan, monitor_args).await?
        }
    };

    emit(&args, &report).await?;
    outcome
}

fn build_workbench(args: &BenchArgs, plan: &Plan) -> AppResult<Workbench> {
    let mut settings = ClientSettings::default();
    if let Some(connect_timeout) = args.connect_timeout.or(plan.connect_timeout) {
        settings.connect_timeout = connect_timeout;
    }
    let executor = ReqwestExecutor::new(&settings)?;
    let default_timeout = args
        .request_timeout
        .or(plan.case_timeout)
        .unwrap_or(DEFAULT_CASE_TIMEOUT);
    Ok(Workbench::new(Arc::new(executor)).with_default_timeout(default_timeout))
}

async fn emit(args: &BenchArgs, report: &Report) -> AppResult<()> {
    match args.output {
        OutputFormat::Text => print!("{}", report::render_text(report)?),
        OutputFormat::Json => println!("{}", report::to_json(report)?),
        OutputFormat::Quiet => {}
    }
    if let Some(path) = args.export_json.as_deref() {
        report::export_json(path, report).await?;
        tracing::info!("Results written to {}", path);
    }
    Ok(())
}
