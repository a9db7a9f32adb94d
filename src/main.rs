use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::mpsc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use notify::{Event, RecursiveMode, Watcher};

use expgen::display::{parse_geometry, DisplayQuery, FixedDisplays, Headless};
use expgen::document::Document;
use expgen::error::GenError;
use expgen::runtime::{BuiltinTemplates, DirTemplates, TemplateSource};
use expgen::settings::{keys, ParamSet};

#[derive(Parser)]
#[command(name = "expgen", version)]
#[command(about = "Experiment script generator (Python script and browser targets)")]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate programs from an experiment document (JSON)
    Generate {
        /// Input document
        file: PathBuf,

        /// Which program(s) to produce
        #[arg(long, value_enum, default_value_t = Target::Script)]
        target: Target,

        /// Write output to file instead of stdout (for `both`, the base path:
        /// `.py` and `.html` are appended)
        #[arg(short)]
        o: Option<PathBuf>,

        #[command(flatten)]
        env: EnvArgs,
    },

    /// Validate a document without producing output
    Check {
        /// Input document
        file: PathBuf,

        #[command(flatten)]
        env: EnvArgs,
    },

    /// Print the built Parameter Set as JSON (for editors)
    Params {
        /// Input document; defaults are used when omitted
        file: Option<PathBuf>,
    },

    /// Regenerate both programs whenever the document changes
    Watch {
        /// Input document
        file: PathBuf,

        /// Base output path; `.py` and `.html` are appended
        #[arg(short)]
        o: PathBuf,

        #[command(flatten)]
        env: EnvArgs,
    },
}

/// Facts about the generation environment.
#[derive(clap::Args, Clone)]
struct EnvArgs {
    /// Attached display as WIDTHxHEIGHT, repeatable; headless if omitted
    #[arg(long = "display")]
    displays: Vec<String>,

    /// Directory holding the browser fragments (built-in copies if omitted)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    /// Synchronous Python script (default)
    Script,
    /// HTML page with the asynchronous experiment script
    Browser,
    /// Both programs
    Both,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate { file, target, o, env } => {
            let (doc, params) = load(&file)?;
            let displays = env.displays()?;
            let templates = env.templates();
            let out = generate(&doc, &params, displays.as_ref(), templates.as_ref(), env.strict);

            match (target, o) {
                (Target::Script, o) => write_output(o.as_deref(), &out.script, "script"),
                (Target::Browser, o) => write_output(o.as_deref(), &out.browser, "browser page"),
                (Target::Both, Some(base)) => write_both(&base, &out),
                (Target::Both, None) => bail!("--target both needs an output base path (-o)"),
            }
        }

        Commands::Check { file, env } => {
            let (doc, params) = load(&file)?;
            let displays = env.displays()?;
            let templates = env.templates();
            let out = generate(&doc, &params, displays.as_ref(), templates.as_ref(), env.strict);
            if out.warnings.is_empty() {
                eprintln!("{}: ok", file.display());
            } else {
                eprintln!("{}: {} warning(s)", file.display(), out.warnings.len());
            }
            Ok(())
        }

        Commands::Params { file } => {
            let params = match file {
                Some(file) => load(&file)?.1,
                None => Document::default().params()?,
            };
            println!("{}", serde_json::to_string_pretty(&params)?);
            Ok(())
        }

        Commands::Watch { file, o, env } => watch(&file, &o, &env),
    }
}

impl EnvArgs {
    fn displays(&self) -> anyhow::Result<Box<dyn DisplayQuery>> {
        if self.displays.is_empty() {
            return Ok(Box::new(Headless));
        }
        let sizes = self
            .displays
            .iter()
            .map(|d| parse_geometry(d).with_context(|| format!("bad --display '{d}', expected WIDTHxHEIGHT")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Box::new(FixedDisplays::new(sizes)))
    }

    fn templates(&self) -> Box<dyn TemplateSource> {
        match &self.templates {
            Some(dir) => Box::new(DirTemplates::new(dir)),
            None => Box::new(BuiltinTemplates),
        }
    }
}

fn load(file: &Path) -> anyhow::Result<(Document, ParamSet)> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("cannot read '{}'", file.display()))?;
    let doc = Document::from_json(&source).with_context(|| file.display().to_string())?;
    let params = doc.params().with_context(|| file.display().to_string())?;
    Ok((doc, params))
}

/// One generation pass. Fatal errors (and warnings under `strict`) exit.
fn generate(
    doc: &Document,
    params: &ParamSet,
    displays: &dyn DisplayQuery,
    templates: &dyn TemplateSource,
    strict: bool,
) -> expgen::Generated {
    match try_generate(doc, params, displays, templates) {
        Ok(out) => {
            for w in &out.warnings {
                eprintln!("warning: {w}");
            }
            if strict && !out.warnings.is_empty() {
                eprintln!("error: {} warning(s) in strict mode", out.warnings.len());
                process::exit(1);
            }
            out
        }
        Err(e) => {
            print_error(&e, params.text(keys::EXP_INFO).unwrap_or(""));
            process::exit(1);
        }
    }
}

fn try_generate(
    doc: &Document,
    params: &ParamSet,
    displays: &dyn DisplayQuery,
    templates: &dyn TemplateSource,
) -> expgen::error::Result<expgen::Generated> {
    let timestamp = chrono::Local::now().format("%B %d, %Y, at %H:%M").to_string();
    expgen::generate_both(params, &doc.context(&timestamp), displays, templates)
}

fn write_output(path: Option<&Path>, text: &str, kind: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("cannot write '{}'", path.display()))?;
            eprintln!("wrote {kind} to {} ({} bytes)", path.display(), text.len());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn write_both(base: &Path, out: &expgen::Generated) -> anyhow::Result<()> {
    write_output(Some(&with_suffix(base, "py")), &out.script, "script")?;
    write_output(Some(&with_suffix(base, "html")), &out.browser, "browser page")
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn watch(file: &Path, base: &Path, env: &EnvArgs) -> anyhow::Result<()> {
    let displays = env.displays()?;
    let templates = env.templates();

    let regenerate = || {
        let result = load(file).and_then(|(doc, params)| {
            try_generate(&doc, &params, displays.as_ref(), templates.as_ref())
                .map_err(|e| {
                    print_error(&e, params.text(keys::EXP_INFO).unwrap_or(""));
                    anyhow::anyhow!("generation failed")
                })
        });
        match result {
            Ok(out) => {
                for w in &out.warnings {
                    eprintln!("warning: {w}");
                }
                if let Err(e) = write_both(base, &out) {
                    eprintln!("error: {e:#}");
                }
            }
            Err(e) => eprintln!("error: {e:#}"),
        }
    };

    let (tx, rx) = mpsc::channel();
    let name = file.file_name().map(|n| n.to_owned());
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res {
            let ours = event.paths.iter().any(|p| p.file_name() == name.as_deref());
            if ours && (event.kind.is_modify() || event.kind.is_create()) {
                let _ = tx.send(());
            }
        }
    })?;
    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    eprintln!("watching {} (ctrl-c to stop)", file.display());
    regenerate();
    for () in rx {
        regenerate();
    }
    Ok(())
}

/// Print an error with a caret under the offending byte of the experiment
/// info literal, when the error carries a span.
fn print_error(e: &GenError, source: &str) {
    eprintln!("error: {e}");

    if let Some(span) = &e.span {
        if span.start <= source.len() {
            let line_num = source[..span.start].chars().filter(|c| *c == '\n').count() + 1;
            let line_start = source[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
            let line_end = source[span.start..]
                .find('\n')
                .map(|i| span.start + i)
                .unwrap_or(source.len());
            let line = &source[line_start..line_end];
            let col = span.start - line_start;

            eprintln!();
            eprintln!("  {line_num} | {line}");
            eprintln!(
                "  {} | {}^",
                " ".repeat(line_num.to_string().len()),
                " ".repeat(col)
            );
        }
    }
}
