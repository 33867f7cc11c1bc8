use std::env;
use std::fs;
use std::process;

use tonnetz::{chord_svg, ChordDocument, DiagramStyle, EngineConfig, Theme};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: tonnetz normalize <input.chords> [--transpose N] [--config config.yaml]
       tonnetz inspect <input.chords> [--config config.yaml]
       tonnetz svg <chord> [--shape] [--light] [--config config.yaml]";

struct Options {
    target: String,
    transpose: i32,
    config: Option<String>,
    shape: bool,
    light: bool,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut target = None;
    let mut transpose = 0;
    let mut config = None;
    let mut shape = false;
    let mut light = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--transpose" => {
                let value = iter.next().ok_or("--transpose needs a value")?;
                transpose = value
                    .parse()
                    .map_err(|_| format!("Invalid transpose value '{}'", value))?;
            }
            "--config" => {
                config = Some(iter.next().ok_or("--config needs a path")?.clone());
            }
            "--shape" => shape = true,
            "--light" => light = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            _ if target.is_none() => target = Some(arg.clone()),
            _ => return Err(format!("Unexpected argument '{}'", arg)),
        }
    }

    Ok(Options {
        target: target.ok_or("Missing input")?,
        transpose,
        config,
        shape,
        light,
    })
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, String> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .map_err(|e| format!("Error reading config '{}': {}", path, e))?;
            EngineConfig::from_yaml(&source).map_err(|e| e.to_string())
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_document(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Error reading file '{}': {}", path, e))
}

fn run(command: &str, options: &Options) -> Result<String, String> {
    let config = load_config(options.config.as_deref())?;

    match command {
        "normalize" => {
            let source = read_document(&options.target)?;
            Ok(tonnetz::normalize_with_config(&source, &config, options.transpose))
        }
        "inspect" => {
            let source = read_document(&options.target)?;
            let doc = ChordDocument::parse_with_config(&source, &config);
            serde_json::to_string_pretty(&doc).map_err(|e| format!("Error encoding JSON: {}", e))
        }
        "svg" => {
            let chord = tonnetz::parse_chord(&options.target)
                .ok_or_else(|| format!("Not a chord: '{}'", options.target))?;
            let style = if options.shape {
                DiagramStyle::Shape
            } else {
                DiagramStyle::Absolute
            };
            let theme = if options.light { Theme::Light } else { config.theme };
            Ok(chord_svg(&chord, style, theme))
        }
        other => Err(format!("Unknown command '{}'\n{}", other, USAGE)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            process::exit(1);
        }
    };

    match run(&args[1], &options) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
