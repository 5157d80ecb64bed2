// src/main.rs
use dantien::config::{load_config, save_config, Config, FeederConfig};
use dantien::error::{DantienError, Result};
use dantien::feeders::build_feeder;
use dantien::local::{spawn_render_loop, Scheduler};
use dantien::processing::model::TimeSeriesModel;
use dantien::visualization::{ConsoleRenderer, Renderer};

use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const CONSOLE_BANDS: usize = 16;
const USAGE: &str = "Usage: dantien <run [config.yaml] | modeeg [channel] | csv <path> [column] | config <path>>";

fn run(config: Config) -> Result<()> {
    config.validate()?;
    let feeder = build_feeder(&config.feeder, config.model.buffer_len)?;
    let model = TimeSeriesModel::new(&config.model, feeder)?;

    println!(
        "{} buffer {} | window {} | {:.1} Hz | zoom {} | wavelet {:?} level {}",
        "dantien".green().bold(),
        model.capacity(),
        model.window_size(),
        config.model.sample_rate,
        config.model.zoom,
        config.model.wavelet,
        config.model.wavelet_level
    );

    let mut scheduler = Scheduler::new(model, config.scheduler.clone())?;
    let stop = Arc::new(AtomicBool::new(false));
    let renderers: Vec<Box<dyn Renderer>> = vec![Box::new(ConsoleRenderer::stdout(CONSOLE_BANDS))];
    let _render = spawn_render_loop(
        scheduler.shared(),
        renderers,
        config.scheduler.render_rate_hz,
        Arc::clone(&stop),
    );

    // Runs until the process is interrupted
    scheduler.run(&stop);
    Ok(())
}

fn parse_index(arg: Option<&String>, what: &str) -> Result<usize> {
    match arg {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| {
            DantienError::Config(format!("invalid {} '{}'", what, value))
        }),
    }
}

fn dispatch(args: &[String]) -> Result<()> {
    match args[1].as_str() {
        "run" => {
            let config = match args.get(2) {
                Some(path) => load_config(path)?,
                None => Config::default(),
            };
            run(config)
        }
        "modeeg" => {
            let channel = parse_index(args.get(2), "channel")?;
            run(Config {
                feeder: FeederConfig::Modeeg { channel },
                ..Config::default()
            })
        }
        "csv" => {
            let path = args.get(2).ok_or_else(|| {
                DantienError::Config("csv mode needs a file path".to_string())
            })?;
            let column = parse_index(args.get(3), "column")?;
            run(Config {
                feeder: FeederConfig::Csv {
                    path: PathBuf::from(path),
                    column,
                    chunk_size: 16,
                    looping: true,
                },
                ..Config::default()
            })
        }
        "config" => {
            let path = args.get(2).map(String::as_str).unwrap_or("dantien.yaml");
            save_config(&Config::default(), path)?;
            println!("Default config written to {}", path);
            Ok(())
        }
        _ => {
            println!("Invalid argument. {}", USAGE);
            Ok(())
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        if let Err(e) = dispatch(&args) {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    } else {
        println!("{}", USAGE);
    }
}
