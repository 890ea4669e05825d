//nexus/src/main.rs
use nexus::app::{ReplaceModeOutcome, Workbench};
use nexus::core::AppContext;
use nexus::kernel::services::adapters::{ensure_settings_file, get_session_path, load_settings};
use nexus::kernel::services::ports::SearchOptions;
use nexus::kernel::ReplaceStep;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use std::{env, io};

mod logging;

const USAGE: &str = "usage: nexus <root> <pattern> [--regex] [--case] [--word] \
[--include LIST] [--exclude LIST] [--replace TEXT]";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(600);

struct Args {
    root: PathBuf,
    pattern: String,
    options: SearchOptions,
    replacement: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut options = SearchOptions::default();
    let mut replacement = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--regex" => options.use_regex = true,
            "--case" => options.case_sensitive = true,
            "--word" => options.whole_word = true,
            "--include" | "--exclude" | "--replace" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("{} needs a value", arg))?;
                match arg.as_str() {
                    "--include" => options.include_filters = SearchOptions::parse_filters(&value),
                    "--exclude" => options.exclude_filters = SearchOptions::parse_filters(&value),
                    _ => replacement = Some(value),
                }
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if arg.starts_with("--") => return Err(format!("unknown option {}", arg)),
            _ => positional.push(arg),
        }
    }

    let [root, pattern]: [String; 2] = positional
        .try_into()
        .map_err(|_| USAGE.to_string())?;
    Ok(Args {
        root: PathBuf::from(root),
        pattern,
        options,
        replacement,
    })
}

fn run(args: Args) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    if let Err(e) = ensure_settings_file() {
        tracing::warn!(error = %e, "settings file unavailable, using defaults");
    }
    let settings = load_settings().unwrap_or_default();
    let mut workbench = Workbench::new(AppContext::new(settings), runtime.handle().clone());
    let session_path = get_session_path();
    match session_path.as_deref() {
        Some(path) => {
            workbench.open_folder_with_session(&args.root, path)?;
        }
        None => workbench.open_folder(&args.root)?,
    }

    let result = search_and_replace(
        &mut workbench,
        args.pattern,
        args.options,
        args.replacement,
    );

    if let Some(path) = session_path.as_deref() {
        if let Err(e) = workbench.save_session_to(path) {
            tracing::warn!(path = %path.display(), error = %e, "session not saved");
        }
    }
    result
}

fn search_and_replace(
    workbench: &mut Workbench,
    pattern: String,
    options: SearchOptions,
    replacement: Option<String>,
) -> io::Result<()> {
    let started = workbench
        .start_search(&pattern, options)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    if started.is_none() {
        return Ok(());
    }
    if !workbench.wait_for_search(SEARCH_TIMEOUT) {
        return Err(io::Error::new(io::ErrorKind::TimedOut, "search timed out"));
    }

    for item in workbench.result_items() {
        println!("{}:{}: {}", item.display_path, item.line, item.snippet);
    }
    eprintln!(
        "{} matches in {} files",
        workbench.store().total_matches(),
        workbench.store().file_count()
    );

    let Some(replacement) = replacement else {
        return Ok(());
    };
    match workbench.set_replace_mode(true) {
        ReplaceModeOutcome::Armed { .. } => {}
        _ => {
            eprintln!("nothing to replace");
            return Ok(());
        }
    }

    loop {
        match workbench.replace_next(&replacement) {
            Ok(ReplaceStep::Replaced(record)) => {
                eprintln!("replaced {}:{}", record.path.display(), record.line)
            }
            Ok(ReplaceStep::Completed { replaced, .. }) => {
                eprintln!("All replacements complete ({})", replaced);
                return Ok(());
            }
            Ok(ReplaceStep::Idle) => return Ok(()),
            Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
        }
    }
}

fn main() -> ExitCode {
    let _logging = logging::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "nexus failed");
            eprintln!("nexus: {}", e);
            ExitCode::FAILURE
        }
    }
}
