mod simulate;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use minipen::platform::cli::{FileStorage, FileSurface, TestClock};
use minipen::{
    EditorController, KeyValueStore, LoadOutcome, PlaygroundConfig, PreviewSurface,
    RecordingSurface, SnapshotStore, SourceDocument, compose, line_numbers,
};

const DEFAULT_CONFIG_FILE: &str = "minipen.toml";

#[derive(Parser)]
#[command(name = "minipen")]
#[command(about = "Live HTML/CSS/JS playground from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./minipen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of the snapshot store (overrides `store_dir`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the three sources into one preview document
    Compose {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save the sources as the snapshot, replacing any previous one
    Save {
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Restore the saved snapshot
    Load {
        /// Write index.html, style.css and script.js here instead of printing
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Delete the saved snapshot
    Forget,
    /// Print the line-number annotation of a file
    Lines {
        file: PathBuf,
    },
    /// Replay a scripted editing session on virtual time
    Simulate {
        /// Script file (see `simulate` module docs for the format)
        script: PathBuf,

        /// Also write every rendered document to this file
        #[arg(long)]
        preview: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// HTML source file
    #[arg(long)]
    html: Option<PathBuf>,

    /// CSS source file
    #[arg(long)]
    css: Option<PathBuf>,

    /// JavaScript source file
    #[arg(long)]
    js: Option<PathBuf>,
}

impl SourceArgs {
    /// Reads the given files; an omitted pane is empty.
    fn read(&self) -> Result<SourceDocument> {
        Ok(SourceDocument::new(
            read_optional(self.html.as_deref())?,
            read_optional(self.css.as_deref())?,
            read_optional(self.js.as_deref())?,
        ))
    }
}

fn read_optional(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => Ok(String::new()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_dir = store;
    }
    log::debug!("Using store at {}", config.store_dir.display());

    match cli.command {
        Commands::Compose { sources, output } => {
            let document = compose(&sources.read()?);
            match output {
                Some(path) => fs::write(&path, document)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => io::stdout().write_all(document.as_bytes())?,
            }
        }
        Commands::Save { sources } => {
            let mut store = snapshot_store(&config);
            let snapshot = store.save(&sources.read()?, chrono::Utc::now())?;
            println!("Code saved successfully! ({})", snapshot.timestamp);
        }
        Commands::Load { out_dir } => {
            let store = snapshot_store(&config);
            match store.load().context("Error loading saved code")? {
                LoadOutcome::NothingSaved => eprintln!("No saved code found"),
                LoadOutcome::Loaded(snapshot) => match out_dir {
                    Some(dir) => {
                        write_sources(&dir, &snapshot.source())?;
                        println!(
                            "Code loaded into {} (saved {})",
                            dir.display(),
                            snapshot.timestamp
                        );
                    }
                    None => {
                        println!("--- html ---\n{}", snapshot.html);
                        println!("--- css ---\n{}", snapshot.css);
                        println!("--- js ---\n{}", snapshot.js);
                    }
                },
            }
        }
        Commands::Forget => {
            snapshot_store(&config).forget()?;
            println!("Saved code removed");
        }
        Commands::Lines { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", line_numbers::annotate(&text));
        }
        Commands::Simulate { script, preview } => {
            let content = fs::read_to_string(&script)
                .with_context(|| format!("Failed to read {}", script.display()))?;
            let steps = simulate::parse_script(&content)
                .with_context(|| format!("Invalid script {}", script.display()))?;
            let surface: Box<dyn PreviewSurface> = match preview {
                Some(path) => Box::new(FileSurface::new(path)),
                None => Box::new(RecordingSurface::new()),
            };
            let storage: Box<dyn KeyValueStore> = Box::new(FileStorage::new(&config.store_dir));
            let mut controller = EditorController::new(storage, surface, TestClock::new(), config);
            simulate::run_script(&mut controller, &steps, &mut io::stdout().lock())?;
        }
    }
    Ok(())
}

fn resolve_config(explicit: Option<&Path>) -> Result<PlaygroundConfig> {
    if let Some(path) = explicit {
        return Ok(PlaygroundConfig::load(path)?);
    }
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        log::info!("Loading {}", default_path.display());
        return Ok(PlaygroundConfig::load(default_path)?);
    }
    Ok(PlaygroundConfig::default())
}

fn snapshot_store(config: &PlaygroundConfig) -> SnapshotStore<FileStorage> {
    SnapshotStore::with_key(FileStorage::new(&config.store_dir), config.storage_key.clone())
}

fn write_sources(dir: &Path, source: &SourceDocument) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for (name, content) in [
        ("index.html", &source.html),
        ("style.css", &source.css),
        ("script.js", &source.js),
    ] {
        let path = dir.join(name);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn missing_source_flags_read_as_empty_panes() {
        let args = SourceArgs {
            html: None,
            css: None,
            js: None,
        };
        assert!(args.read().unwrap().is_empty());
    }

    #[test]
    fn loaded_sources_land_in_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceDocument::new("<p>h</p>", "p{}", "1;");
        write_sources(dir.path(), &source).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), "<p>h</p>");
        assert_eq!(fs::read_to_string(dir.path().join("style.css")).unwrap(), "p{}");
        assert_eq!(fs::read_to_string(dir.path().join("script.js")).unwrap(), "1;");
    }

    #[test]
    fn explicit_config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pen.toml");
        fs::write(&path, "storage_key = \"cli_slot\"\n").unwrap();
        let config = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.storage_key, "cli_slot");
        assert!(resolve_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
