//! xdialog - display dialog boxes from shell scripts.

use std::{io::Write, process::ExitCode};

use log::LevelFilter;
use simple_logger::SimpleLogger;

use xdialog::{
    Command, Env,
    cli::{self, VERSION},
};

fn main() -> ExitCode {
    let env = Env::from_env();
    init_logging(env.log_level.unwrap_or(LevelFilter::Warn));

    match run(&env) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("xdialog: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(level: LevelFilter) {
    // Fails only when a logger is already installed
    let _ = SimpleLogger::new().with_level(level).without_timestamps().init();
}

fn run(env: &Env) -> Result<u8, xdialog::Error> {
    match cli::parse_env()? {
        Command::Usage => {
            cli::print_help();
            Ok(0)
        }
        Command::Version(output) => {
            let mut sink = output.sink();
            writeln!(sink, "{VERSION}")?;
            Ok(0)
        }
        Command::Run(invocation) => {
            log::debug!("running {:?}", invocation.widget);
            Ok(xdialog::run(invocation, env)?.code())
        }
    }
}
