use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vidscript", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a script and report syntax errors and warnings.
    Check(CheckArgs),
    /// Print the parsed program tree as JSON.
    Dump(DumpArgs),
    /// Print the state of every element of one scene at one instant.
    Eval(EvalArgs),
    /// Stream fixed-rate frame snapshots as JSON lines.
    Sample(SampleArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input script.
    script: PathBuf,

    /// Emit machine-readable JSON instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Exit non-zero when any warning is reported.
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Input script.
    script: PathBuf,
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// Input script.
    script: PathBuf,

    /// Scene index (0-based, declaration order).
    #[arg(long, default_value_t = 0)]
    scene: usize,

    /// Sample time in seconds from scene start.
    #[arg(long)]
    time: f64,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input script.
    script: PathBuf,

    /// Frames per second (numerator).
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Frames-per-second denominator, e.g. 1001 for NTSC rates.
    #[arg(long, default_value_t = 1)]
    fps_den: u32,

    /// Only sample this scene (0-based). Samples every scene when omitted.
    #[arg(long)]
    scene: Option<usize>,

    /// Measured narration length as `SCENE=SECONDS`; may be repeated.
    #[arg(long = "narration", value_parser = parse_narration)]
    narration: Vec<(usize, f64)>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per parallel batch.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Output path. Writes to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_narration(s: &str) -> Result<(usize, f64), String> {
    let (scene, secs) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SCENE=SECONDS, got '{s}'"))?;
    let scene = scene
        .trim()
        .parse()
        .map_err(|e| format!("invalid scene index '{scene}': {e}"))?;
    let secs: f64 = secs
        .trim()
        .trim_end_matches('s')
        .parse()
        .map_err(|e| format!("invalid seconds '{secs}': {e}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("narration length must be >= 0, got {secs}"));
    }
    Ok((scene, secs))
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Dump(args) => cmd_dump(args),
        Command::Eval(args) => cmd_eval(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

/// Read and parse a script; syntax errors are reported here and yield `None`.
fn load_program(path: &Path, json: bool) -> anyhow::Result<Option<vidscript::Program>> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("read script '{}'", path.display()))?;
    match vidscript::parse(&src) {
        Ok(program) => Ok(Some(program)),
        Err(err) => {
            if json {
                let report = serde_json::json!({ "ok": false, "error": err });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                eprint!("{}", err.render(&src, &path.display().to_string()));
            }
            Ok(None)
        }
    }
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let Some(program) = load_program(&args.script, args.json)? else {
        return Ok(ExitCode::FAILURE);
    };
    let diagnostics = vidscript::validate_program(&program);

    if args.json {
        let report = serde_json::json!({
            "ok": true,
            "scenes": program.scenes.len(),
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for d in &diagnostics {
            eprintln!("warning: {}", d.message);
            eprintln!("  --> scene {} \"{}\"", d.scene, d.scene_title);
        }
        eprintln!(
            "{}: {} scene(s), {} warning(s)",
            args.script.display(),
            program.scenes.len(),
            diagnostics.len()
        );
    }

    if args.deny_warnings && !diagnostics.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<ExitCode> {
    let Some(program) = load_program(&args.script, false)? else {
        return Ok(ExitCode::FAILURE);
    };
    println!("{}", serde_json::to_string_pretty(&program)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_eval(args: EvalArgs) -> anyhow::Result<ExitCode> {
    let Some(program) = load_program(&args.script, false)? else {
        return Ok(ExitCode::FAILURE);
    };
    if !args.time.is_finite() || args.time < 0.0 {
        anyhow::bail!("--time must be a finite number >= 0");
    }
    let snapshot = vidscript::evaluate_program(&program, args.scene, args.time)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<ExitCode> {
    let Some(program) = load_program(&args.script, false)? else {
        return Ok(ExitCode::FAILURE);
    };

    let opts = vidscript::SampleOpts {
        fps: vidscript::Fps::new(args.fps, args.fps_den)?,
        parallel: args.parallel,
        threads: args.threads,
        chunk_size: args.chunk_size,
        narration_secs: args.narration.into_iter().collect::<BTreeMap<_, _>>(),
    };
    let session = vidscript::SampleSession::new(&program, opts)?;

    let out: Box<dyn Write + Send> = match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut sink = vidscript::JsonLinesSink::new(out);

    let stats = match args.scene {
        Some(scene) => session.sample_scene(scene, &mut sink)?,
        None => session.sample_all(&mut sink)?,
    };
    sink.into_inner().flush()?;

    eprintln!(
        "sampled {} frame(s), {} static",
        stats.frames_total, stats.frames_static
    );
    if let Some(path) = &args.out {
        eprintln!("wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
