use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;

use transcribe_worker_core::acquisition::domain::remote_fetcher::ProgressFn;
use transcribe_worker_core::acquisition::infrastructure::bounded_downloader::BoundedDownloader;
use transcribe_worker_core::audio::domain::transcription_engine::TranscriptionEngine;
use transcribe_worker_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use transcribe_worker_core::audio::infrastructure::whisper_engine::WhisperEngine;
use transcribe_worker_core::job::domain::job_result::JobResult;
use transcribe_worker_core::pipeline::job_logger::LogJobLogger;
use transcribe_worker_core::pipeline::transcribe_job_use_case::TranscribeJobUseCase;
use transcribe_worker_core::shared::constants::{
    DEFAULT_LANGUAGE, MAX_PAYLOAD_SIZE, WHISPER_MODEL_NAME, WHISPER_MODEL_URL,
};
use transcribe_worker_core::shared::device::{select_device, DevicePolicy};
use transcribe_worker_core::shared::model_resolver;
use transcribe_worker_core::shared::worker_config::WorkerConfig;

/// Speech-to-text job worker.
///
/// Reads jobs shaped like `{"input": {"type": "blob"|"url", ...}}` and writes
/// `{"result": ...}` or `{"error": ...}` for each one.
#[derive(Parser)]
#[command(name = "transcribe-worker")]
struct Cli {
    /// Job JSON file. Without it, jobs are read from stdin, one per line.
    job: Option<PathBuf>,

    /// Whisper ggml model file (resolved from cache or downloaded if omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory with a pre-packaged model, checked after the user cache.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Compute device: auto, cpu or gpu.
    #[arg(long, default_value = "auto")]
    device: DevicePolicy,

    /// Inference threads (default: min(cores, 4)).
    #[arg(long)]
    threads: Option<usize>,

    /// Language code passed to the engine.
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Maximum accepted download size in bytes.
    #[arg(long, default_value_t = MAX_PAYLOAD_SIZE)]
    max_payload_size: u64,

    /// Directory for per-job temporary audio files.
    #[arg(long)]
    scratch_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let job_file = cli.job.clone();
    let model_dir = cli.model_dir.clone();
    let config = WorkerConfig {
        model_path: cli.model,
        device: cli.device,
        threads: cli.threads,
        language: cli.language,
        max_payload_size: cli.max_payload_size,
        scratch_dir: cli.scratch_dir,
    };

    // The engine is loaded once, before the first job is accepted.
    let engine = build_engine(&config, model_dir.as_deref())?;
    let downloader = BoundedDownloader::new(config.max_payload_size)?;
    let use_case = TranscribeJobUseCase::new(engine, Box::new(downloader), &config);

    match job_file {
        Some(path) => run_single(&use_case, &path),
        None => run_stream(&use_case),
    }
}

fn run_single(
    use_case: &TranscribeJobUseCase,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    let result = process_line(use_case, &raw);
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &result)?;
    writeln!(stdout)?;
    Ok(())
}

fn run_stream(use_case: &TranscribeJobUseCase) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Waiting for jobs on stdin");
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let result = process_line(use_case, &line);
        serde_json::to_writer(&mut stdout, &result)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }
    Ok(())
}

fn process_line(use_case: &TranscribeJobUseCase, raw: &str) -> JobResult {
    let job: Value = match serde_json::from_str(raw) {
        Ok(job) => job,
        Err(e) => return JobResult::Error(format!("invalid job JSON: {e}")),
    };
    let job_id = job.get("id").and_then(Value::as_str).map(str::to_owned);
    let mut logger = LogJobLogger::new(job_id);
    use_case.handle(&job, &mut logger)
}

fn build_engine(
    config: &WorkerConfig,
    model_dir: Option<&Path>,
) -> Result<Arc<dyn TranscriptionEngine>, Box<dyn std::error::Error>> {
    let model_path = match &config.model_path {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {WHISPER_MODEL_NAME}");
            let path = model_resolver::resolve(
                WHISPER_MODEL_NAME,
                WHISPER_MODEL_URL,
                model_dir,
                Some(download_progress()),
            )?;
            eprintln!();
            path
        }
    };

    let device = select_device(config.device);
    let engine = WhisperEngine::load(
        &model_path,
        device,
        config.inference_threads(),
        Box::new(FfmpegAudioReader),
    )?;
    Ok(Arc::new(engine))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(job) = &cli.job {
        if !job.exists() {
            return Err(format!("Job file not found: {}", job.display()).into());
        }
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if let Some(dir) = &cli.scratch_dir {
        if !dir.is_dir() {
            return Err(format!("Scratch directory not found: {}", dir.display()).into());
        }
    }
    if cli.max_payload_size == 0 {
        return Err("Max payload size must be greater than zero".into());
    }
    if cli.threads == Some(0) {
        return Err("Threads must be at least 1".into());
    }
    if cli.language.trim().is_empty() {
        return Err("Language must not be empty".into());
    }
    Ok(())
}

fn download_progress() -> ProgressFn {
    let last_reported = AtomicU64::new(u64::MAX);
    Box::new(move |downloaded, total| {
        // Report whole percents, or every MiB when the size is unknown.
        let step = if total > 0 {
            downloaded * 100 / total
        } else {
            downloaded >> 20
        };
        if last_reported.swap(step, Ordering::Relaxed) == step {
            return;
        }
        if total > 0 {
            eprint!("\rDownloading speech model... {step}%");
        } else {
            eprint!("\rDownloading speech model... {step} MiB");
        }
    })
}
