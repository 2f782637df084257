mod replay;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, anyhow};
use clap::{App, Arg};
use tracing::info;
use tracing_subscriber::EnvFilter;

use insim_state::TrackerConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = App::new("statedump")
        .about("Replays a recorded InSim packet log through the state tracker")
        .arg(
            Arg::with_name("CONFIG")
                .help("Path to a tracker config TOML file")
                .short("c")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("RESYNC_WINDOW")
                .help("Minimum milliseconds between two full state requests")
                .long("resync-window")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("SNAPSHOT")
                .help("Dump the tracked state before every disconnect and at the end")
                .long("snapshot"),
        )
        .arg(
            Arg::with_name("GENERATE_CONFIG")
                .help("Print a default config file and exit")
                .long("generate-config"),
        )
        .arg(
            Arg::with_name("LOG")
                .help("The JSON-lines packet log to replay, or - for stdin")
                .required_unless("GENERATE_CONFIG")
                .index(1),
        )
        .get_matches();

    if matches.is_present("GENERATE_CONFIG") {
        print!("{}", TrackerConfig::generate_default_toml());
        return Ok(());
    }

    let mut config = match matches.value_of("CONFIG") {
        Some(path) => TrackerConfig::load(Path::new(path))
            .with_context(|| format!("failed to load config {path}"))?,
        None => TrackerConfig::default(),
    };
    if let Some(window) = matches.value_of("RESYNC_WINDOW") {
        config.resync_window_ms = window
            .parse()
            .map_err(|_| anyhow!("invalid resync window: {window}"))?;
    }

    let log = matches
        .value_of("LOG")
        .ok_or_else(|| anyhow!("no packet log given"))?;
    let snapshot = matches.is_present("SNAPSHOT");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let connection = if log == "-" {
        replay::replay(io::stdin().lock(), config, &mut out, snapshot)?
    } else {
        let file = File::open(log).with_context(|| format!("failed to open {log}"))?;
        replay::replay(BufReader::new(file), config, &mut out, snapshot)?
    };
    out.flush()?;

    info!(
        tracking = connection.state().is_some(),
        probes_sent = connection.transport().sent(),
        "replay finished"
    );
    Ok(())
}
