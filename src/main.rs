mod cli;

use cinetag::{
    config,
    images::PosterFetcher,
    logging,
    metadata::{providers::TmdbProvider, Resolver},
    pipeline::{AssumeYes, Confirmation, ConsoleConfirmation, Orchestrator, PipelineSettings},
    probe::{self, Ffprobe, StreamKind},
    scanner::MediaItem,
    subtitles::{OpenSubtitlesClient, SubtitleFetcher},
};

use anyhow::{Context, Result};
use cinetag_av::tools::{FFMPEG, FFPROBE};
use cinetag_av::Tagger;
use cinetag_common::paths::ensure_directory;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Parse { filenames, json }) => {
            logging::init(cli.verbose, None)?;
            parse_names(filenames, *json)
        }
        Some(Commands::Probe { file, json }) => {
            logging::init(cli.verbose, None)?;
            probe_file(file, cli.config.as_deref(), *json)
        }
        Some(Commands::CheckTools) => {
            logging::init(cli.verbose, None)?;
            check_tools(cli.config.as_deref())
        }
        Some(Commands::Validate { config }) => {
            logging::init(cli.verbose, None)?;
            let path = config.as_deref().or(cli.config.as_deref());
            validate_config(path)
        }
        None => organize(&cli),
    }
}

fn organize(cli: &Cli) -> Result<()> {
    let dir = cli
        .directory
        .as_deref()
        .context("No directory given")?;

    // Checked before anything touches the disk, log file included
    ensure_directory(dir).context("Invalid library directory")?;

    let config = config::read_config_or_default(cli.config.as_deref())?;
    logging::init(cli.verbose, Some(&config.library.log_file))?;
    let mut config = config::finalize(config)?;
    if cli.no_subtitles {
        config.subtitles.enabled = false;
    }

    let api_key = config::require_tmdb_key(&config)?.to_string();

    let ffprobe = match probe::get_tool_path(FFPROBE, config.tools.ffprobe_path.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("{}; audio and subtitle probes will report nothing", e);
            FFPROBE.into()
        }
    };
    let ffmpeg = match probe::get_tool_path(FFMPEG, config.tools.ffmpeg_path.as_deref()) {
        Ok(path) => path,
        Err(e) if cli.dry_run => {
            tracing::warn!("{}", e);
            FFMPEG.into()
        }
        Err(e) => return Err(e).context("ffmpeg is required to write metadata"),
    };

    let provider = TmdbProvider::with_base_urls(
        api_key,
        config.tmdb.base_url.as_str(),
        config.tmdb.image_base_url.as_str(),
    )?;
    let resolver = Resolver::new(
        Arc::new(provider),
        config.tmdb.primary_language.as_str(),
        config.tmdb.fallback_language.as_str(),
    );

    let fetcher = match config.subtitles.credentials().filter(|_| config.subtitles.enabled) {
        Some(credentials) => {
            let client =
                OpenSubtitlesClient::with_base_url(credentials, config.subtitles.base_url.as_str())?;
            SubtitleFetcher::new(Arc::new(client), config.subtitles.language.as_str())
        }
        None => SubtitleFetcher::disabled(),
    };

    let confirmation: Box<dyn Confirmation> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(ConsoleConfirmation::stdio())
    };

    let settings = PipelineSettings {
        processed_marker: config.library.processed_marker.clone(),
        skip_audio_language: config.subtitles.skip_audio_language.clone(),
        embedded_language: config.subtitles.embedded_language.clone(),
        dry_run: cli.dry_run,
        subtitles: config.subtitles.enabled,
    };

    let orchestrator = Orchestrator::new(
        resolver,
        Arc::new(Ffprobe::new(ffprobe)),
        Arc::new(Tagger::new(ffmpeg, config.library.processed_marker.as_str())),
        Arc::new(fetcher),
        confirmation,
        settings,
    )
    .with_posters(PosterFetcher::new()?);

    tracing::info!("Organizing {:?}", dir);

    // Create tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(orchestrator.run(dir))?;
    println!("\n{}", report);
    Ok(())
}

fn parse_names(filenames: &[String], json: bool) -> Result<()> {
    let items: Vec<MediaItem> = filenames
        .iter()
        .map(|name| MediaItem::from_path(Path::new(name)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        let parsed = cinetag_parser::parse(&item.raw_filename);
        print!("{} -> \"{}\" [{}]", item.raw_filename, item.extracted_title, item.kind);
        if let Some(episode) = parsed.episode {
            print!(" S{:02}E{:02}", episode.season, episode.episode);
        }
        if let Some(year) = parsed.year {
            print!(" ({})", year);
        }
        println!();
    }
    Ok(())
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let program = probe::get_tool_path(FFPROBE, config.tools.ffprobe_path.as_deref())?;
    let ffprobe = Ffprobe::new(program);

    let audio = ffprobe.streams(file, StreamKind::Audio)?;
    let subtitles = ffprobe.streams(file, StreamKind::Subtitle)?;

    if json {
        let value = serde_json::json!({
            "file": file,
            "audio": audio,
            "subtitles": subtitles,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    for (label, streams) in [("Audio", &audio), ("Subtitle", &subtitles)] {
        println!("\n{} Tracks: {}", label, streams.len());
        for stream in streams {
            println!(
                "  [{}] {}",
                stream.index,
                stream.language.as_deref().unwrap_or("(untagged)")
            );
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = probe::check_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. ffmpeg is required to tag files, ffprobe to skip subtitles.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let (config, source) = match path {
        Some(p) => (config::load_config(p)?, format!("{:?}", p)),
        None => match config::find_config_file() {
            Some(p) => (config::load_config(&p)?, format!("{:?}", p)),
            None => (config::load_config_or_default(None)?, "defaults".to_string()),
        },
    };

    println!("✓ Configuration is valid ({})", source);
    println!(
        "  TMDB: key {}, {} -> {}",
        if config.tmdb.api_key.is_empty() { "missing" } else { "set" },
        config.tmdb.primary_language,
        config.tmdb.fallback_language
    );
    println!(
        "  Subtitles: {}",
        if config.subtitles.enabled {
            format!("enabled ({})", config.subtitles.language)
        } else {
            "disabled".to_string()
        }
    );
    println!("  Processed marker: {}", config.library.processed_marker);
    println!("  Log file: {}", config.library.log_file.display());

    Ok(())
}
