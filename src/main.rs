use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use overscribe::capture::{
    DefaultFileSaver, ExportDependencies, ExportDestination, ExportManager, FileSnapshotSource,
    LayeredSnapshotSource, SnapshotSource, SystemClipboard,
};
use overscribe::notification::LogNotifier;
use overscribe::replay::{self, Script};
use overscribe::store::MemoryStore;
use overscribe::{Config, Overlay};

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

#[derive(Parser, Debug)]
#[command(name = "overscribe")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("OVERSCRIBE_GIT_HASH"), ")"),
    about = "Annotation overlay engine: draw on top of any surface and export a flattened screenshot"
)]
struct Cli {
    /// Use this config file instead of ~/.config/overscribe/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Replay a JSON input script through the engine and export the result
    Replay {
        /// Replay script (JSON)
        script: PathBuf,

        /// Where to write the exported PNG
        #[arg(long, short = 'o', value_name = "PNG")]
        output: Option<PathBuf>,

        /// PNG used as the screenshot under the annotations
        #[arg(long, value_name = "PNG")]
        background: Option<PathBuf>,

        /// Logical width (overrides the script)
        #[arg(long)]
        width: Option<u32>,

        /// Logical height (overrides the script)
        #[arg(long)]
        height: Option<u32>,

        /// Device scale (overrides overlay.device_scale)
        #[arg(long)]
        scale: Option<f64>,

        /// Copy the export to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write the defaults to the config path when no file exists yet
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        CliCommand::Replay {
            script,
            output,
            background,
            width,
            height,
            scale,
            copy,
        } => run_replay(
            &config,
            ReplayArgs {
                script,
                output,
                background,
                width,
                height,
                scale,
                copy,
            },
        ),
        CliCommand::Config { init } => {
            if init {
                let path = Config::get_config_path()?;
                if path.exists() {
                    log::info!("Config already exists at {}", path.display());
                } else {
                    Config::default().save()?;
                    println!("Wrote default config to {}", path.display());
                }
            }
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to serialize config")?
            );
            Ok(())
        }
    }
}

struct ReplayArgs {
    script: PathBuf,
    output: Option<PathBuf>,
    background: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    scale: Option<f64>,
    copy: bool,
}

fn run_replay(config: &Config, args: ReplayArgs) -> Result<()> {
    if args.output.is_none() && !args.copy {
        bail!("nothing to do: pass --output and/or --copy");
    }

    let script = Script::load(&args.script)?;
    let width = args.width.or(script.width).unwrap_or(DEFAULT_WIDTH);
    let height = args.height.or(script.height).unwrap_or(DEFAULT_HEIGHT);

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;

    let source: Arc<dyn SnapshotSource> = match &args.background {
        Some(path) => Arc::new(FileSnapshotSource::new(path)),
        None => Arc::new(LayeredSnapshotSource::default()),
    };
    let dependencies = ExportDependencies {
        source,
        saver: Arc::new(DefaultFileSaver),
        clipboard: Arc::new(SystemClipboard),
        notifier: Arc::new(LogNotifier),
    };
    let manager = ExportManager::with_dependencies(runtime.handle(), dependencies);

    let mut overlay =
        Overlay::new(config, MemoryStore::new(), width, height)?.with_export_manager(manager);
    if let Some(scale) = args.scale {
        overlay
            .resize(width, height, scale)
            .context("failed to apply device scale")?;
    }

    replay::apply(overlay.input_mut(), &script.events)?;
    log::info!(
        "Replayed {} events into {} actions",
        script.events.len(),
        overlay.input().actions().len()
    );

    let destination = if args.copy {
        ExportDestination::ClipboardOnly
    } else {
        ExportDestination::BytesOnly
    };
    let result = runtime
        .block_on(overlay.export(destination))
        .context("export failed")?;

    if let Some(output) = &args.output {
        std::fs::write(output, &result.image_data)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!(
            "Wrote {} ({}x{}{})",
            output.display(),
            result.width,
            result.height,
            if result.degraded {
                ", annotations only"
            } else {
                ""
            }
        );
    }
    if result.copied_to_clipboard {
        println!("Copied to clipboard");
    }

    Ok(())
}
