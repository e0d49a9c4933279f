mod logger;
mod output;

use clap::{Arg, ArgAction, ArgMatches, Command};
use phptac_core::{
    batch, compile_source_to_tac, generate_ast_with_depth_limit, generate_error_report, run_with_stack, Script,
    TacConfig,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Command::new("phptac")
        .version("0.1.0")
        .about("Lowers PHP source into three-address code");

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    logger::init(matches.get_count("verbose"));
    dispatch_commands(&matches)
}

fn fallthrough_arg() -> Arg {
    Arg::new("fallthrough")
        .help("Keep fallthrough between switch cases instead of adding an implicit break")
        .long("fallthrough")
        .action(ArgAction::SetTrue)
}

/// Sets up the CLI with subcommands and arguments.
fn setup_cli(cli: Command) -> Command {
    cli.arg(
        Arg::new("verbose")
            .help("Increase log output (-v info, -vv debug, -vvv trace)")
            .short('v')
            .long("verbose")
            .global(true)
            .action(ArgAction::Count),
    )
    .subcommand(
        Command::new("batch")
            .about("Convert every .php file under a directory into <dir>_TAC")
            .arg(
                Arg::new("dir")
                    .help("The directory to convert")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("config")
                    .help("JSON config file")
                    .short('c')
                    .long("config")
                    .value_parser(clap::value_parser!(String))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("jobs")
                    .help("Number of worker threads")
                    .short('j')
                    .long("jobs")
                    .value_parser(clap::value_parser!(usize))
                    .value_name("N"),
            )
            .arg(fallthrough_arg())
            .arg(
                Arg::new("no-wrap")
                    .help("Do not wrap listings in <?php ?> tags")
                    .long("no-wrap")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("json")
                    .help("Print the batch report as JSON")
                    .long("json")
                    .action(ArgAction::SetTrue),
            ),
    )
    .subcommand(
        Command::new("lower")
            .about("Lower one PHP file and print its listing")
            .arg(
                Arg::new("file")
                    .help("The PHP file to lower")
                    .required(true)
                    .index(1),
            )
            .arg(fallthrough_arg())
            .arg(
                Arg::new("json")
                    .help("Print the listing as a JSON object")
                    .long("json")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("output")
                    .help("Write the listing to a file instead of stdout")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(String))
                    .value_name("FILE"),
            ),
    )
    .subcommand(
        Command::new("ast")
            .about("Print the parsed AST of a PHP file")
            .arg(
                Arg::new("file")
                    .help("The PHP file to parse")
                    .required(true)
                    .index(1),
            ),
    )
}

fn load_script(sub_m: &ArgMatches) -> Result<Script, ExitCode> {
    let file = sub_m.get_one::<String>("file").cloned().unwrap_or_default();
    Script::new(PathBuf::from(file)).map_err(|e| {
        eprintln!("{}", generate_error_report(e.as_ref()));
        ExitCode::FAILURE
    })
}

fn run_batch(sub_m: &ArgMatches) -> ExitCode {
    let dir = PathBuf::from(sub_m.get_one::<String>("dir").cloned().unwrap_or_default());

    let config = match sub_m.get_one::<String>("config") {
        Some(path) => match TacConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => TacConfig::default(),
    };
    let mut options = config.batch_options();
    if let Some(jobs) = sub_m.get_one::<usize>("jobs") {
        options.jobs = *jobs;
    }
    if sub_m.get_flag("fallthrough") {
        options.lower.switch_fallthrough = true;
    }
    if sub_m.get_flag("no-wrap") {
        options.wrap_php_tags = false;
    }

    let json = sub_m.get_flag("json");
    let total = batch::find_php_files(&dir).map(|files| files.len()).unwrap_or(0);
    let progress = output::batch_progress(total);
    if json {
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let result = batch::convert_directory_with(&dir, &options, |file| {
        progress.set_message(file.input.display().to_string());
        progress.inc(1);
    });
    progress.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match report.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", output::batch_table(&report));
        if let Err(e) = output::write_summary(std::io::stdout(), &report) {
            eprintln!("Error writing summary: {}", e);
        }
    }
    ExitCode::SUCCESS
}

fn run_lower(sub_m: &ArgMatches) -> ExitCode {
    let script = match load_script(sub_m) {
        Ok(script) => script,
        Err(code) => return code,
    };
    let mut options = TacConfig::default().lower;
    if sub_m.get_flag("fallthrough") {
        options.switch_fallthrough = true;
    }

    let listing = match compile_source_to_tac(&script, &options) {
        Ok(listing) => listing,
        Err(e) => {
            eprintln!("{}", generate_error_report(e.as_ref()));
            return ExitCode::FAILURE;
        }
    };

    let text = if sub_m.get_flag("json") {
        let value = serde_json::json!({
            "file": script.name,
            "instructions": listing.lines(),
            "labels": listing.labels(),
        });
        match serde_json::to_string_pretty(&value) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error serializing listing: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        listing.render()
    };

    match sub_m.get_one::<String>("output") {
        Some(path) => {
            if let Err(e) = fs::write(path, &text) {
                eprintln!("Error writing {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        }
        None => println!("{}", text),
    }
    ExitCode::SUCCESS
}

fn run_ast(sub_m: &ArgMatches) -> ExitCode {
    let script = match load_script(sub_m) {
        Ok(script) => script,
        Err(code) => return code,
    };
    match generate_ast_with_depth_limit(&script, TacConfig::default().lower.max_depth) {
        Ok(ast) => {
            println!("{:#?}", ast);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", generate_error_report(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

/// Single-file commands parse and lower on a thread with room for the
/// nesting limit.
fn on_worker(work: impl FnOnce() -> ExitCode + Send) -> ExitCode {
    let stack_size = TacConfig::default().lower.stack_size();
    run_with_stack(stack_size, work).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    })
}

/// Dispatches the command based on the parsed arguments.
fn dispatch_commands(matches: &ArgMatches) -> ExitCode {
    match matches.subcommand() {
        Some(("batch", sub_m)) => run_batch(sub_m),
        Some(("lower", sub_m)) => on_worker(|| run_lower(sub_m)),
        Some(("ast", sub_m)) => on_worker(|| run_ast(sub_m)),
        _ => {
            println!("No valid subcommand was used. Use --help for more information.");
            ExitCode::FAILURE
        }
    }
}
