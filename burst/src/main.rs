use core::error::Error;
use std::sync::Arc;

use burst::{cfg::Config, cmd::Cmd, dispatcher::Dispatcher, engine::http::HttpTask, sink::Stdout};
use clap::Parser;

pub fn main() {
    let cmd = Cmd::parse();

    if let Err(err) = run(cmd) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}

fn run(cmd: Cmd) -> Result<(), Box<dyn Error>> {
    burst::logging::init(cmd.verbose)?;

    let cfg: Config = cmd.try_into()?;
    let task = HttpTask::new(cfg.target.clone(), cfg.timeout);

    let report = Dispatcher::new(cfg, Arc::new(task), Arc::new(Stdout)).run()?;
    log::debug!("{report:?}");

    Ok(())
}
