use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use miniplay::bridge::{self, HostArg};
use miniplay::config::AppConfig;
use miniplay::engine::{AudioService, StubBackendFactory, StubDeviceEnumerator};
use miniplay::fixtures::{self, ToneSpec};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "miniplay", about = "Play audio files and inspect the playback engine")]
struct Cli {
    /// Use the in-memory stub engine instead of the audio hardware
    #[arg(long, global = true)]
    stub: bool,
    /// Configuration file (defaults to $MINIPLAY_CONFIG, then miniplay.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List playback and capture devices
    Devices,
    /// Play a file to completion
    Play { path: PathBuf },
    /// Show the engine clock, optionally moving it first
    Clock {
        #[arg(long, conflicts_with = "set_ms")]
        set_frames: Option<u64>,
        #[arg(long)]
        set_ms: Option<u64>,
    },
    /// Show channels, sample rate, volume and clock
    Props,
    /// Set the master volume and print the resulting value
    Volume { value: f32 },
    /// Invoke an operation by its host name with JSON arguments
    Call {
        operation: String,
        /// Arguments as JSON; bare words are taken as strings
        args: Vec<String>,
    },
    /// Write a sine tone WAV for testing playback
    Tone {
        output: PathBuf,
        #[arg(long, default_value_t = 440.0)]
        frequency: f32,
        #[arg(long, default_value_t = 250)]
        duration_ms: u64,
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,
        #[arg(long, default_value_t = 2)]
        channels: u16,
    },
}

#[derive(Serialize)]
struct PlayReport {
    result: String,
    completion: Option<String>,
}

#[derive(Serialize)]
struct ClockReport {
    time_in_pcm_frames: u64,
    time_in_milliseconds: u64,
}

fn main() -> ExitCode {
    miniplay::init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Tone {
        output,
        frequency,
        duration_ms,
        sample_rate,
        channels,
    } = &cli.command
    {
        return run_tone(output, *frequency, *duration_ms, *sample_rate, *channels);
    }

    let service = build_service(&cli);
    let outcome = match cli.command {
        Commands::Devices => print_json(&service.get_devices()?),
        Commands::Play { path } => run_play(&service, &path),
        Commands::Clock { set_frames, set_ms } => run_clock(&service, set_frames, set_ms),
        Commands::Props => print_json(&service.engine_properties()?),
        Commands::Volume { value } => {
            service.set_volume(value)?;
            print_json(&json!({ "volume": service.get_volume()? }))
        }
        Commands::Call { operation, args } => run_call(&service, &operation, &args),
        Commands::Tone { .. } => Ok(()),
    };

    service.shutdown()?;
    outcome
}

fn build_service(cli: &Cli) -> AudioService {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };

    if cli.stub {
        log::info!("[CLI] Using stub engine");
        AudioService::with_backends(
            config,
            Arc::new(StubBackendFactory::default()),
            Arc::new(StubDeviceEnumerator::default()),
        )
    } else {
        AudioService::from_config(config)
    }
}

fn run_play(service: &AudioService, path: &Path) -> Result<()> {
    let path = path.to_string_lossy();
    let mut completion = None;
    let result = service
        .play_audio(&path, |message| completion = Some(message.to_string()))
        .with_context(|| format!("playing {}", path))?;

    print_json(&PlayReport { result, completion })
}

fn run_clock(service: &AudioService, set_frames: Option<u64>, set_ms: Option<u64>) -> Result<()> {
    if let Some(frames) = set_frames {
        service.set_time_in_pcm_frames(frames)?;
    }
    if let Some(millis) = set_ms {
        service.set_time_in_milliseconds(millis)?;
    }

    print_json(&ClockReport {
        time_in_pcm_frames: service.get_time_in_pcm_frames()?,
        time_in_milliseconds: service.get_time_in_milliseconds()?,
    })
}

fn run_call(service: &AudioService, operation: &str, raw_args: &[String]) -> Result<()> {
    let mut args: Vec<HostArg> = raw_args
        .iter()
        .map(|raw| HostArg::Value(parse_arg(raw)))
        .collect();

    if operation == "playAudio" && args.len() == 1 {
        args.push(HostArg::callback(|message| {
            eprintln!("{}", message);
        }));
    }

    let result = bridge::invoke(service, operation, args)
        .with_context(|| format!("calling {}", operation))?;
    print_json(&result)
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn run_tone(
    output: &Path,
    frequency: f32,
    duration_ms: u64,
    sample_rate: u32,
    channels: u16,
) -> Result<()> {
    let spec = ToneSpec {
        frequency_hz: frequency,
        duration: Duration::from_millis(duration_ms),
        sample_rate,
        channels,
        ..ToneSpec::default()
    };
    fixtures::write_tone(output, &spec)?;
    print_json(&fixtures::read_wav_info(output)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
