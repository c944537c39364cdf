use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tagwise::{config::Config, pipeline::FileProcessor, utils};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "tagwise")]
#[command(about = "Classify files and derive a ranked tag set")]
#[command(version)]
struct Cli {
    /// File or directory to analyze
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Declared media type (guessed from the file name when omitted)
    #[arg(long)]
    media_type: Option<String>,

    /// Extra tags merged into the result
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Print records as JSON lines
    #[arg(long)]
    json: bool,

    /// Configuration file (defaults to config/settings.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_default(),
    };
    let processor = FileProcessor::new(&config);

    let files: Vec<(PathBuf, String)> = if cli.path.is_dir() {
        WalkDir::new(&cli.path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let path = entry.into_path();
                let media_type = utils::guess_media_type(&path);
                (path, media_type)
            })
            .collect()
    } else {
        let metadata = std::fs::metadata(&cli.path)
            .with_context(|| format!("Failed to read file: {}", cli.path.display()))?;
        anyhow::ensure!(metadata.is_file(), "Not a regular file: {}", cli.path.display());
        let media_type = cli
            .media_type
            .clone()
            .unwrap_or_else(|| utils::guess_media_type(&cli.path));
        vec![(cli.path.clone(), media_type)]
    };

    for (path, media_type) in &files {
        let mut record = processor.process_file(path, media_type).await;
        if !cli.tags.is_empty() {
            record.tags = processor.tag_processor().merge(&[&record.tags, &cli.tags]);
        }

        if cli.json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!(
                "{} [{}] {}",
                record.path.display(),
                record.category,
                record.tags.join(", ")
            );
        }
    }

    Ok(())
}
