use std::env;
use std::fs;
use std::io;
use std::io::Write;

use anyhow::Error;
use clap::App;
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use trisat::solver::{Solver, SolverError};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("TRISAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("trisat")
        .version(env!("TRISAT_VERSION"))
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage("-w, --workers=[N] 'Number of worker threads for the consistency passes'")
        .arg_from_usage("-s, --solve 'Extract and print a satisfying assignment'")
        .arg_from_usage("-o, --output=[FILE] 'Write the extracted assignment to FILE'")
        .get_matches();

    init_logging();

    info!("This is trisat {}", env!("TRISAT_VERSION"));
    info!(
        "  {} build - {}",
        env!("TRISAT_PROFILE"),
        env!("TRISAT_RUSTC_VERSION")
    );

    let mut solver = Solver::new();

    {
        let config = solver.config_mut();
        config.find_solution = matches.is_present("solve") || matches.is_present("output");
        if let Some(workers) = matches.value_of("workers") {
            config.workers = workers.parse::<usize>()?.max(1);
        }
        config.solution_output = matches.value_of("output").map(Into::into);
    }

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    solver.add_dimacs_cnf(file)?;

    match solver.solve() {
        Ok(true) => {
            println!("s SATISFIABLE");
            if let Some(model) = solver.model() {
                print!("v");
                for lit in model {
                    print!(" {}", lit);
                }
                println!(" 0");
            }
            Ok(10)
        }
        Ok(false) => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        Err(err @ SolverError::ExtractionFailed) | Err(err @ SolverError::InvalidModel) => {
            // The fixpoint was consistent but no assignment could be certified; this
            // is a distinct failure, not a verdict.
            error!("{}", err);
            println!("s UNKNOWN");
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}
