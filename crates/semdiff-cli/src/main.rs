//! `semdiff`: the command-line driver tying the core crate's `differ` and
//! `driver` together with the `semdiff-parse`/`semdiff-vcs` capability
//! implementations and the `render` module's output formats.

mod cli;
mod diagnose;
mod multi_profile;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser as _;
use colored::Colorize;

use semdiff::capability::Parser as ParserCapability;
use semdiff::config::SemdiffConfig;
use semdiff::differ::{self, DiffOptions};
use semdiff::driver::{CancellationToken, MultiFileDriver};
use semdiff::error::DiffError;
use semdiff::model::{ComparisonMode, DiffResult};
use semdiff::render;

use cli::{Args, OutputFormat};
use semdiff_parse::SemdiffParser;
use semdiff_vcs::GixRefResolver;

fn init_tracing(json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn load_config(args: &Args) -> anyhow::Result<SemdiffConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|err| anyhow::anyhow!("reading {}: {err}", path.display()))?;
            SemdiffConfig::from_toml(&text)?
        }
        None => SemdiffConfig::default(),
    };

    if let Some(filter) = args.impact_filter {
        config.impact.filter = filter.into();
    }
    if args.include_formatting {
        config.impact.include_formatting = true;
    }
    if args.exclude_non_impactful {
        config.impact.include_non_impactful = false;
    }

    config.validate()?;
    Ok(config)
}

fn diff_single_file(
    parser: &dyn ParserCapability,
    config: &SemdiffConfig,
    old: &Path,
    new: &Path,
) -> Result<DiffResult, DiffError> {
    let read = |path: &Path| -> Result<String, DiffError> {
        fs::read_to_string(path).map_err(|err| DiffError::Input {
            path: path.display().to_string(),
            detail: err.to_string(),
        })
    };

    let old_text = read(old)?;
    let new_text = read(new)?;
    let hint = new
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let old_tree = parser.parse(&old_text, &hint).map_err(|err| DiffError::Parse {
        path: old.display().to_string(),
        detail: err.to_string(),
    })?;
    let new_tree = parser.parse(&new_text, &hint).map_err(|err| DiffError::Parse {
        path: new.display().to_string(),
        detail: err.to_string(),
    })?;

    let new_path_str = new.display().to_string();
    let opts = DiffOptions::new(config, &new_path_str);
    let changes = differ::diff(old_tree.root(), new_tree.root(), &opts);
    let changes = semdiff::impact::filter_changes(changes, &config.impact);

    Ok(DiffResult::new(
        ComparisonMode::Direct,
        old.display().to_string(),
        new.display().to_string(),
        config.profiles.build_profiles.clone(),
        changes,
        chrono::Utc::now(),
    ))
}

/// The set of profile tags this run should produce results for: either the
/// repeated `--profile` flags, or a single anonymous run if none were given.
fn profile_tags(args: &Args) -> Vec<String> {
    if args.profiles.is_empty() {
        vec![String::new()]
    } else {
        args.profiles.clone()
    }
}

fn config_for_profile(base: &SemdiffConfig, profile: &str) -> SemdiffConfig {
    let mut config = base.clone();
    if !profile.is_empty() {
        config.profiles.build_profiles = vec![profile.to_string()];
    }
    config
}

fn as_single_file_multi(result: &DiffResult) -> semdiff::model::MultiFileResult {
    let status = if result.changes.is_empty() {
        semdiff::model::ChangeStatus::Unchanged
    } else {
        semdiff::model::ChangeStatus::Modified
    };
    let wrapped = semdiff::model::FileEntry {
        new_path: result.new_path.clone(),
        old_path: Some(result.old_path.clone()),
        status,
        outcome: semdiff::model::FileStatus::Ok { result: Box::new(result.clone()) },
    };
    semdiff::model::MultiFileResult::summarize(vec![wrapped], result.mode)
}

fn render_single(result: &DiffResult, args: &Args) -> String {
    match args.format {
        OutputFormat::Json => semdiff::render::json::render_single_file(result),
        OutputFormat::Unified => semdiff::render::unified::render_single(result),
        OutputFormat::Console => semdiff::render::console::render_single(result, args.use_color()),
        OutputFormat::InlineHtml => semdiff::render::inline_html::render(&result.changes),
        OutputFormat::Html => {
            semdiff::render::html::render_document(&as_single_file_multi(result), args.stylesheet.as_deref())
        }
        OutputFormat::HtmlFragment => {
            semdiff::render::html::render_fragment(&as_single_file_multi(result), args.stylesheet.as_deref())
        }
    }
}

fn render_multi(result: &semdiff::model::MultiFileResult, args: &Args) -> String {
    match args.format {
        OutputFormat::Json => semdiff::render::json::render_multi_file(result),
        OutputFormat::Unified => semdiff::render::unified::render_multi(result),
        OutputFormat::Console => semdiff::render::console::render_multi(result, args.use_color()),
        OutputFormat::Html => semdiff::render::html::render_document(result, args.stylesheet.as_deref()),
        OutputFormat::HtmlFragment => semdiff::render::html::render_fragment(result, args.stylesheet.as_deref()),
        OutputFormat::InlineHtml => {
            let all_changes: Vec<_> = result
                .files
                .iter()
                .filter_map(|f| match &f.outcome {
                    semdiff::model::FileStatus::Ok { result } => Some(result.changes.clone()),
                    semdiff::model::FileStatus::Error { .. } => None,
                })
                .flatten()
                .collect();
            semdiff::render::inline_html::render(&all_changes)
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let config = load_config(args)?;

    if args.diagnose {
        let ok = diagnose::run(args, &config);
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::from(2) });
    }

    let parser = SemdiffParser::new();

    if let Some(range) = &args.ref_range {
        let repo = args.repo.clone().unwrap_or_else(|| std::path::PathBuf::from("."));
        let resolver = GixRefResolver::new();
        let token = CancellationToken::new();

        let tagged: Vec<(String, semdiff::model::MultiFileResult)> = profile_tags(args)
            .into_iter()
            .map(|profile| -> anyhow::Result<(String, semdiff::model::MultiFileResult)> {
                let profiled_config = config_for_profile(&config, &profile);
                let driver = MultiFileDriver::new(&profiled_config, &parser)?;
                let result = driver.diff_ref_range(&repo, range, &resolver, &token)?;
                Ok((profile, result))
            })
            .collect::<anyhow::Result<_>>()?;

        let merged = multi_profile::merge_multi(tagged);
        let exit = render::exit_code(&merged);
        println!("{}", render_multi(&merged, args));
        return Ok(ExitCode::from(u8::try_from(exit).unwrap_or(2)));
    }

    let (Some(old), Some(new)) = (args.old.as_ref(), args.new.as_ref()) else {
        anyhow::bail!("expected either OLD and NEW paths, or --ref-range");
    };

    if old.is_dir() || new.is_dir() {
        let token = CancellationToken::new();
        let tagged: Vec<(String, semdiff::model::MultiFileResult)> = profile_tags(args)
            .into_iter()
            .map(|profile| -> anyhow::Result<(String, semdiff::model::MultiFileResult)> {
                let profiled_config = config_for_profile(&config, &profile);
                let driver = MultiFileDriver::new(&profiled_config, &parser)?;
                let result = driver.diff_folders(old, new, &token)?;
                Ok((profile, result))
            })
            .collect::<anyhow::Result<_>>()?;

        let merged = multi_profile::merge_multi(tagged);
        let exit = render::exit_code(&merged);
        println!("{}", render_multi(&merged, args));
        return Ok(ExitCode::from(u8::try_from(exit).unwrap_or(2)));
    }

    let tagged: Vec<(String, DiffResult)> = profile_tags(args)
        .into_iter()
        .map(|profile| -> anyhow::Result<(String, DiffResult)> {
            let profiled_config = config_for_profile(&config, &profile);
            let result = diff_single_file(&parser, &profiled_config, old, new)?;
            Ok((profile, result))
        })
        .collect::<anyhow::Result<_>>()?;

    let merged = multi_profile::merge_single(tagged);
    let exit = render::exit_code_for_summary(merged.stats.total_changes);
    println!("{}", render_single(&merged, args));
    Ok(ExitCode::from(u8::try_from(exit).unwrap_or(2)))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_json);

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
