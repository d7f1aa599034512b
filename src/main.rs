use clap::Parser;
use ibxsync::{analyze, build_plan, Executor, Result, WapiClient};
use log::{error, info, warn};
use std::process;

mod cli;

/*-------------------------------------------------------------------------------------------------
  Main CLI Entry Point
-------------------------------------------------------------------------------------------------*/

fn main() {
    let args = cli::Args::parse();

    stderrlog::new()
        .verbosity(args.verbose.log_level_filter())
        .init()
        .unwrap();

    if let Err(error) = run(&args) {
        error!("{error}");
        process::exit(1);
    }
}

fn run(args: &cli::Args) -> Result<()> {
    let mut records = cli::input::load_records(&args.csv_file)?;

    // A live run needs a configured WAPI client; a dry run must work without one.
    let mut client = if args.dry_run {
        None
    } else {
        Some(WapiClient::new()?)
    };

    if args.skip_existing {
        match &client {
            Some(client) => {
                records = cli::filter_existing(client, records, &args.network_view)?;
            }
            None => warn!("--skip-existing requires a live run; ignoring"),
        }
    }

    let analysis = analyze(&records);
    cli::log::analysis_summary(&analysis);

    let plan = build_plan(&analysis, &records);
    info!(
        "Planned {} container step(s) and {} network step(s)",
        plan.container_step_count(),
        plan.network_step_count()
    );

    let executor = Executor::new(&args.network_view);
    let results = match client.as_mut() {
        Some(client) => {
            if args.ensure_ea_defs {
                let names = cli::collect_attribute_names(&plan);
                let created =
                    client.ensure_ea_definitions(names.iter().map(String::as_str))?;
                if created > 0 {
                    info!("Created {created} missing extensible attribute definition(s)");
                }
            }
            executor.run(&plan, client)
        }
        None => {
            if args.ensure_ea_defs {
                warn!("--ensure-ea-defs requires a live run; ignoring");
            }
            executor.dry_run(&plan)
        }
    };

    cli::log::execution_summary(&results);
    cli::output::results_table(&results);

    if let Some(path) = &args.csv_report {
        cli::report::save(&results, path)?;
        info!("Saved creation results to {path:?}");
    }

    Ok(())
}
