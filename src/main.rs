// ==========================================
// Fieldwork costing - headless CLI
// ==========================================
// Subcommands:
//   compute       project + catalogues -> Estimate Cost report
//   validate      readiness check of a project document
//   import-costs  element-cost sheet -> element-costs store
// Exit codes: 0 ok, 1 failure, 2 validation, 3 catalogue/rate card
// ==========================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use fieldwork_costing::api::{exit_codes, export_report, write_csv_report, ApiError, ProjectValidator};
use fieldwork_costing::app::{open_store, AppState, CataloguePaths, ProjectModel};
use fieldwork_costing::catalogue::{IndustriesCatalogue, RateCardCatalogue};
use fieldwork_costing::config::EstimatorConfig;
use fieldwork_costing::importer::ElementCostImporter;
use fieldwork_costing::logging;

#[derive(Parser, Debug)]
#[command(
    name = "fieldwork-costing",
    about = "Estimate market-research fieldwork costs from a project document",
    version
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate, rebuild the sample plan and price a project
    Compute(ComputeArgs),
    /// Run the readiness checks only
    Validate {
        /// Project document (JSON)
        project: PathBuf,
    },
    /// Import an element-cost sheet (CSV/XLSX) into the store
    ImportCosts {
        /// Element-costs database
        db: PathBuf,
        /// Project type the sheet belongs to
        project_type: String,
        /// Sheet file
        sheet: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ComputeArgs {
    /// Project document (JSON)
    project: PathBuf,
    /// Cost hierarchy catalogue (JSON)
    hierarchy: PathBuf,
    /// Rate-card catalogue; without it the saved sample plan is priced as is
    #[arg(long)]
    rate_cards: Option<PathBuf>,
    /// Industries override catalogue
    #[arg(long)]
    industries: Option<PathBuf>,
    /// Element-costs + config database
    #[arg(long)]
    db: Option<PathBuf>,
    /// Report path (.xlsx or .csv); CSV on stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print the estimate as JSON instead of the report
    #[arg(long, conflicts_with = "out")]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }
    tracing::debug!(version = fieldwork_costing::VERSION, "starting");

    match run(cli.command) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("error: {:#}", err);
            let code = err
                .downcast_ref::<ApiError>()
                .map(ApiError::exit_code)
                .unwrap_or(exit_codes::FAILURE);
            ExitCode::from(code as u8)
        }
    }
}

fn run(command: Command) -> anyhow::Result<i32> {
    match command {
        Command::Compute(args) => compute(args),
        Command::Validate { project } => validate(project),
        Command::ImportCosts { db, project_type, sheet } => import_costs(db, &project_type, sheet),
    }
}

fn compute(args: ComputeArgs) -> anyhow::Result<i32> {
    let paths = CataloguePaths {
        hierarchy: args.hierarchy,
        rate_cards: args.rate_cards,
        industries: args.industries,
        db: args.db,
    };
    let state = AppState::new(&paths).context("loading catalogues")?;

    let mut model = state.project_model();
    model.load_from_file(&args.project)?;
    let estimate = state.estimate_api().compute(model.project())?;

    if args.json {
        let json = serde_json::to_string_pretty(&estimate).context("serialising estimate")?;
        println!("{}", json);
    } else if let Some(out) = &args.out {
        export_report(out, &estimate)?;
        println!("{} rows, grand total {} -> {}", estimate.rows.len(), estimate.grand_total, out.display());
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write_csv_report(&mut handle, &estimate)?;
        handle.flush().context("flushing stdout")?;
    }
    Ok(exit_codes::SUCCESS)
}

fn validate(project: PathBuf) -> anyhow::Result<i32> {
    let mut model = ProjectModel::new(
        Arc::new(RateCardCatalogue::default()),
        Arc::new(IndustriesCatalogue::new()),
        EstimatorConfig::default(),
    );
    model.load_from_file(&project)?;

    let outcome = ProjectValidator::new().validate(model.project());
    if outcome.ok {
        println!("ok");
        Ok(exit_codes::SUCCESS)
    } else {
        println!("{}: {}", outcome.field, outcome.message);
        Ok(exit_codes::VALIDATION)
    }
}

fn import_costs(db: PathBuf, project_type: &str, sheet: PathBuf) -> anyhow::Result<i32> {
    let (repo, _config) = open_store(&db)?;

    let summary = ElementCostImporter::new(&repo)
        .import_file(project_type, &sheet)
        .map_err(ApiError::from)?;
    println!(
        "{}: {} rows, levels [{}], lengths [{}]",
        summary.project_type,
        summary.rows_imported,
        summary.levels.join(", "),
        summary.lengths.join(", ")
    );
    Ok(exit_codes::SUCCESS)
}
