/// kfcss command line: one-shot builds, mirroring, audits, and dev sessions

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kfcss_compiler::{mirror_file, MirrorSummary, Preprocessor, SassCli};
use kfcss_dev::{change_channel, KfCssPlugin, PluginOptions, RealFs, StandaloneHost};
use kfcss_mirror::{duplicate_selectors, variable_report, VariantMirror};

#[derive(Parser, Debug)]
#[command(name = "kfcss")]
#[command(about = "Utility stylesheet builder with generated responsive variants")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the entry stylesheet and write both artifacts
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        /// Only log progress at debug level
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build, then rebuild on every source change until interrupted
    Dev {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Append responsive variants to an already compiled stylesheet
    Mirror {
        #[arg(value_name = "INPUT", default_value = "dist/kf.css")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT", default_value = "dist/kf-responsive.css")]
        output: PathBuf,

        /// Classes to leave out (comma separated)
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,
    },

    /// Report duplicate selectors and custom property usage
    Audit {
        #[arg(value_name = "INPUT", default_value = "dist/kf.css")]
        input: PathBuf,
    },
}

/// Flags shared by commands that resolve a project layout.
#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to kfcss.toml in the root, if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Library directory, skipping autodetection
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Entry stylesheet
    #[arg(long, value_name = "FILE")]
    entry: Option<PathBuf>,

    /// Artifact directory
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Watch root or glob
    #[arg(long, value_name = "PATH")]
    watch: Option<PathBuf>,

    /// Source extension to react to
    #[arg(long)]
    extension: Option<String>,

    /// Classes to leave out of mirroring (comma separated)
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Sass executable (defaults to $KFCSS_SASS, then `sass`)
    #[arg(long, value_name = "PROGRAM")]
    sass: Option<String>,
}

impl ProjectArgs {
    fn root(&self) -> anyhow::Result<PathBuf> {
        std::fs::canonicalize(&self.root)
            .with_context(|| format!("Project root not found: {}", self.root.display()))
    }

    fn options(&self, root: &Path) -> anyhow::Result<PluginOptions> {
        let file = match &self.config {
            Some(path) => PluginOptions::load(&root.join(path))?,
            None => PluginOptions::discover(root)?,
        };

        let flags = PluginOptions {
            base_dir: self.base_dir.clone(),
            entry: self.entry.clone(),
            out_dir: self.out_dir.clone(),
            watch: self.watch.clone(),
            extension: self.extension.clone(),
            ignore: (!self.ignore.is_empty()).then(|| self.ignore.clone()),
        };
        Ok(file.merge(flags))
    }

    fn preprocessor(&self) -> Arc<dyn Preprocessor> {
        match &self.sass {
            Some(program) => Arc::new(SassCli::new(program.clone())),
            None => Arc::new(SassCli::from_env()),
        }
    }

    fn plugin(&self) -> anyhow::Result<KfCssPlugin> {
        let root = self.root()?;
        let options = self.options(&root)?;
        Ok(KfCssPlugin::new(&root, &options, &RealFs, self.preprocessor()))
    }
}

fn log_summary(summary: &MirrorSummary) {
    if summary.declared {
        let found: Vec<String> = summary.breakpoints.iter().map(|bp| bp.to_string()).collect();
        tracing::info!("Detected breakpoints: {}", found.join(", "));
    } else {
        tracing::warn!("No breakpoint variables found, using defaults");
    }
    for (bp, count) in summary.breakpoints.iter().zip(&summary.counts) {
        tracing::info!("  {}: {} rules", bp.prefix, count);
    }
}

async fn run_build(project: ProjectArgs, quiet: bool) -> anyhow::Result<()> {
    let plugin = project.plugin()?;
    let output = plugin.build(quiet).await?;
    if !quiet {
        log_summary(&output.summary);
    }
    Ok(())
}

async fn run_dev(project: ProjectArgs) -> anyhow::Result<()> {
    let plugin = project.plugin()?;
    let (changes, events) = change_channel();
    let host = Arc::new(StandaloneHost::new(changes)?);
    let dev = plugin.start(host).await?;

    tokio::select! {
        session = dev.run(events) => {
            tracing::info!(
                builds = session.last_build().map_or(0, |t| t.generation),
                failed = session.failed_builds(),
                "Dev session ended"
            );
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Interrupted, stopping dev session");
        }
    }
    Ok(())
}

fn run_mirror(input: &Path, output: &Path, ignore: Vec<String>) -> anyhow::Result<()> {
    if !input.is_file() {
        bail!("Input file not found: {}", input.display());
    }

    let mut mirror = VariantMirror::new();
    if !ignore.is_empty() {
        mirror = mirror.with_ignore(ignore.into_iter().collect());
    }

    tracing::info!("Mirroring {} -> {}", input.display(), output.display());
    let summary = mirror_file(&mirror, input, output)?;
    log_summary(&summary);
    tracing::info!("Wrote {}", output.display());
    Ok(())
}

fn run_audit(input: &Path) -> anyhow::Result<()> {
    let css = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("--- DUPLICATE SELECTORS ---");
    let dupes = duplicate_selectors(&css);
    if dupes.is_empty() {
        println!("None found.");
    }
    for dupe in &dupes {
        println!("{}: {} times", dupe.selector, dupe.count);
    }

    let report = variable_report(&css);
    println!("\nDefined: {}", report.defined.len());
    println!("Used Unique: {}", report.used.len());

    let sections: [(&str, Vec<&str>); 3] = [
        ("EMPTY VALUES (Defined with no value)", report.empty.iter().map(String::as_str).collect()),
        ("MISSING (Used but not defined)", report.missing()),
        ("UNUSED (Defined but not used)", report.unused()),
    ];
    for (title, names) in sections {
        println!("\n--- {} ---", title);
        if names.is_empty() {
            println!("None");
        }
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build { project, quiet } => run_build(project, quiet).await,
        Command::Dev { project } => run_dev(project).await,
        Command::Mirror {
            input,
            output,
            ignore,
        } => run_mirror(&input, &output, ignore),
        Command::Audit { input } => run_audit(&input),
    }
}
