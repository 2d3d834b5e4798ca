//! git-signed - commit signature auditing for git repositories
//!
//! The `git-signed` command gates a pipeline on the signature status of the
//! commits in a range, and carries the collaborator workflows that make
//! those signatures verifiable.
//!
//! ## Commands
//!
//! - (default): audit `git log` from an optional start commit to `HEAD`
//! - `join`: publish your key, configure signing, add yourself to the manifest
//! - `sync`: import every contributor's public key
//! - `export`: print your public key and where to upload it

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, Level};

use contributor_keys::{
    export, join, sync, ContributorManifest, GitConfig, Gpg, JoinRequest, UpsertOutcome,
    DEFAULT_KEY_SERVER, DEFAULT_MANIFEST,
};
use signed_core::{
    audit_repository, render_json, render_text, set_color_enabled, AuditError, LogSourceConfig,
    RunConfig,
};

#[derive(Parser, Debug)]
#[command(name = "git-signed")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Audit commit signatures and share contributor keys", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    audit: AuditArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    /// Repository to operate on (default: current directory)
    #[arg(short = 'C', long = "repo", env = "GIT_SIGNED_REPO", global = true)]
    repo: Option<PathBuf>,

    /// git executable
    #[arg(long, env = "GIT_SIGNED_GIT", default_value = "git", global = true)]
    git: PathBuf,

    /// gpg executable
    #[arg(long, env = "GIT_SIGNED_GPG", default_value = "gpg", global = true)]
    gpg: PathBuf,

    /// Contributor manifest (default: package.json in the repository)
    #[arg(long, env = "GIT_SIGNED_MANIFEST", global = true)]
    manifest: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Args, Debug, Clone)]
struct AuditArgs {
    /// Audit only commits after this revision (hash, branch, tag, HEAD~n)
    #[arg(value_name = "COMMIT", value_parser = parse_commit)]
    commit: Option<String>,

    /// Fail on any commit whose signature is not good, not only unsigned ones
    #[arg(long, env = "GIT_SIGNED_TRUST_COMMITS")]
    trust_commits: bool,

    /// Abort when git log has not finished after this many seconds
    #[arg(
        long,
        env = "GIT_SIGNED_TIMEOUT",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish your public key, configure signing and add yourself to the
    /// contributor manifest
    Join(JoinArgs),

    /// Import the public key of every contributor in the manifest
    Sync,

    /// Print your public key and where to upload it
    Export,
}

#[derive(Args, Debug)]
struct JoinArgs {
    /// Your name (default: git config user.name)
    #[arg(long)]
    name: Option<String>,

    /// Your email (default: git config user.email)
    #[arg(long)]
    email: Option<String>,

    /// Secret key to use (default: the first key matching your email)
    #[arg(long)]
    key_id: Option<String>,

    /// Key server to publish to
    #[arg(long, default_value = DEFAULT_KEY_SERVER)]
    key_server: String,
}

/// Range start: any revision git understands. Only option-like values are
/// refused so they cannot reach `git log` as flags.
fn parse_commit(value: &str) -> std::result::Result<String, String> {
    if value.is_empty() {
        Err("range start must not be empty".to_string())
    } else if value.starts_with('-') {
        Err(format!("`{value}` is not a revision"))
    } else {
        Ok(value.to_string())
    }
}

/// The command to run, resolved once from the parsed arguments.
#[derive(Debug)]
enum Command {
    Audit {
        run: RunConfig,
        source: LogSourceConfig,
        format: OutputFormat,
    },
    Join(JoinRequest),
    Sync,
    Export,
}

impl Cli {
    fn into_command(self) -> (GlobalArgs, Command) {
        let command = match self.command {
            None => {
                let mut source = LogSourceConfig::default().with_program(&self.global.git);
                if let Some(repo) = &self.global.repo {
                    source = source.with_repo_dir(repo);
                }
                if let Some(secs) = self.audit.timeout {
                    source = source.with_timeout(Duration::from_secs(secs));
                }
                Command::Audit {
                    run: RunConfig::new(self.audit.commit, self.audit.trust_commits),
                    source,
                    format: self.audit.format,
                }
            }
            Some(Commands::Join(args)) => Command::Join(JoinRequest {
                name: args.name,
                email: args.email,
                key_id: args.key_id,
                key_server: args.key_server,
            }),
            Some(Commands::Sync) => Command::Sync,
            Some(Commands::Export) => Command::Export,
        };
        (self.global, command)
    }
}

/// External tools and files the collaborator workflows operate on.
struct Session {
    gpg: Gpg,
    git: GitConfig,
    manifest_path: PathBuf,
}

impl GlobalArgs {
    fn session(&self) -> Session {
        let manifest_path = match (&self.manifest, &self.repo) {
            (Some(path), _) => path.clone(),
            (None, Some(repo)) => repo.join(DEFAULT_MANIFEST),
            (None, None) => PathBuf::from(DEFAULT_MANIFEST),
        };
        Session {
            gpg: Gpg::new(&self.gpg),
            git: GitConfig::new(&self.git, self.repo.clone()),
            manifest_path,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    // Setup logging
    let level = if cli.global.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let color = !cli.global.no_color && std::env::var_os("NO_COLOR").is_none();
    signed_core::init_tracing(cli.global.log_json, level, color);
    if !color {
        set_color_enabled(false);
    }

    let (global, command) = cli.into_command();
    debug!(?command, "resolved command");

    match run(&global, command) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(failure_code(&err))
        }
    }
}

fn run(global: &GlobalArgs, command: Command) -> Result<u8> {
    match command {
        Command::Audit {
            run: config,
            source,
            format,
        } => cmd_audit(&config, &source, format),
        Command::Join(request) => cmd_join(&global.session(), request),
        Command::Sync => cmd_sync(&global.session()),
        Command::Export => cmd_export(&global.session()),
    }
}

/// Exit code for a failed run: git's own status when git log failed, else 1.
fn failure_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AuditError>())
        .map(AuditError::exit_code)
        .unwrap_or(1)
}

// ── audit ─────────────────────────────────────────────────────────────────

fn cmd_audit(run: &RunConfig, source: &LogSourceConfig, format: OutputFormat) -> Result<u8> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let verdict = runtime.block_on(audit_repository(run, source))?;

    match format {
        OutputFormat::Text => render_text(&verdict)
            .write_to(&mut std::io::stdout().lock(), &mut std::io::stderr().lock())
            .context("Failed to write report")?,
        OutputFormat::Json => {
            let json = render_json(&verdict)?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(json.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write report")?;
        }
    }

    Ok(verdict.exit_code)
}

// ── collaborator workflows ────────────────────────────────────────────────

fn load_manifest(session: &Session) -> Result<ContributorManifest> {
    ContributorManifest::load(&session.manifest_path)
        .with_context(|| format!("Failed to load {}", session.manifest_path.display()))
}

fn cmd_join(session: &Session, request: JoinRequest) -> Result<u8> {
    let mut manifest = load_manifest(session)?;
    let outcome = join(&session.gpg, &session.git, &mut manifest, request)?;
    manifest
        .save()
        .with_context(|| format!("Failed to write {}", manifest.path().display()))?;

    let contributor = &outcome.contributor;
    let verb = match outcome.upsert {
        UpsertOutcome::Added => "Added",
        UpsertOutcome::Updated => "Updated",
    };
    println!(
        "{} {} {} <{}> in {}",
        "✓".green().bold(),
        verb,
        contributor.name.bold(),
        contributor.email,
        manifest.path().display()
    );
    if let Some(key) = &contributor.key {
        println!("  Key: {}", key.cyan());
    }
    println!("  Commits in this repository will now be signed.");
    println!();
    println!(
        "{}",
        format!(
            "Commit {} so the other contributors can sync your key.",
            manifest.path().display()
        )
        .yellow()
        .bold()
    );
    Ok(0)
}

fn cmd_sync(session: &Session) -> Result<u8> {
    let manifest = load_manifest(session)?;
    let imported = sync(&session.gpg, &manifest, |target| {
        eprintln!(
            "{} {} ({})",
            "Fetching key for".bright_black(),
            target.name.bold(),
            target.key
        );
    })?;

    for (target, report) in &imported {
        debug!(name = %target.name, report = %report.trim(), "imported key");
    }
    println!(
        "{} Imported {} contributor key(s)",
        "✓".green().bold(),
        imported.len()
    );
    Ok(0)
}

fn cmd_export(session: &Session) -> Result<u8> {
    let exported = export(&session.gpg, &session.git)?;
    print!("{}", exported.armored);

    match &exported.settings_url {
        Some(url) => eprintln!(
            "\n{} {}",
            "Add this key to your account at".yellow().bold(),
            url.cyan().bold()
        ),
        None => eprintln!(
            "\n{}",
            "Add this key to the GPG key settings of your git hosting provider."
                .yellow()
                .bold()
        ),
    }
    Ok(0)
}
