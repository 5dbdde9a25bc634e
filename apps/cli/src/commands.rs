//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use ragwalk_core::assembler::{NotFoundPage, PageAssembler};
use ragwalk_core::locale::{self, LocaleRegistry};
use ragwalk_core::pipeline::{self, BuildConfig, BuildResult, ProgressReporter};
use ragwalk_core::routes::route_path;
use ragwalk_shared::{AppConfig, CONFIG_FILE_NAME, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ragwalk: build the localized RAG walkthrough site.
#[derive(Parser)]
#[command(
    name = "ragwalk",
    version,
    about = "Resolve RAG walkthrough steps to localized pages and build the static site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./ragwalk.toml, then ~/.ragwalk/ragwalk.toml).
    #[arg(long, global = true, env = "RAGWALK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render every step page to the output directory.
    Build {
        /// Output directory (overrides `[build] out_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Content directory (overrides `[site] content_dir`).
        #[arg(short, long)]
        content: Option<PathBuf>,

        /// Render every supported locale, not only the default.
        #[arg(long)]
        all_locales: bool,

        /// Fail if any step resolves to not found.
        #[arg(long)]
        strict: bool,

        /// Maximum pages rendered in parallel.
        #[arg(long)]
        concurrency: Option<u32>,
    },

    /// Print the static route table.
    Routes,

    /// Assemble and print one step page.
    Show {
        /// Step id as it appears in the route (e.g. `3`).
        step: String,

        /// Locale code; unsupported codes fall back to the default.
        #[arg(short, long)]
        locale: Option<String>,

        /// Content directory (overrides `[site] content_dir`).
        #[arg(short, long)]
        content: Option<PathBuf>,
    },

    /// List supported locales.
    Locales {
        /// Also print the language-toggle target for this locale.
        #[arg(long)]
        current: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default ragwalk.toml.
    Init {
        /// Where to write it (defaults to ./ragwalk.toml).
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ragwalk=info,ragwalk_core=info,ragwalk_shared=info",
        1 => "ragwalk=debug,ragwalk_core=debug,ragwalk_shared=debug",
        _ => "ragwalk=trace,ragwalk_core=trace,ragwalk_shared=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Build {
            out,
            content,
            all_locales,
            strict,
            concurrency,
        } => {
            let (config, registry) = site_context(config_path)?;
            let overrides = BuildOverrides {
                out,
                content,
                all_locales,
                strict,
                concurrency,
            };
            cmd_build(config, registry, overrides).await
        }
        Command::Routes => {
            let (config, _) = site_context(config_path)?;
            cmd_routes(&config)
        }
        Command::Show {
            step,
            locale,
            content,
        } => {
            let (config, registry) = site_context(config_path)?;
            cmd_show(config, registry, &step, locale.as_deref(), content)
        }
        Command::Locales { current } => {
            let (_, registry) = site_context(config_path)?;
            cmd_locales(registry, current.as_deref())
        }
        Command::Config { action } => match action {
            ConfigAction::Init { path } => cmd_config_init(path.as_deref()),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the config and install the process-wide locale registry from it.
fn site_context(config_path: Option<&Path>) -> Result<(AppConfig, &'static LocaleRegistry)> {
    let config = load_config(config_path)?;
    let registry = locale::install(LocaleRegistry::from_config(&config.site)?)?;
    Ok((config, registry))
}

/// Build-time flags that override the config file.
struct BuildOverrides {
    out: Option<PathBuf>,
    content: Option<PathBuf>,
    all_locales: bool,
    strict: bool,
    concurrency: Option<u32>,
}

/// Relative config paths resolve against the working directory.
fn base_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))
}

fn apply_content_override(config: &mut AppConfig, content: Option<PathBuf>) {
    if let Some(dir) = content {
        config.site.content_dir = dir.to_string_lossy().to_string();
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(
    mut config: AppConfig,
    registry: &LocaleRegistry,
    overrides: BuildOverrides,
) -> Result<()> {
    apply_content_override(&mut config, overrides.content);
    if let Some(out) = overrides.out {
        config.build.out_dir = out.to_string_lossy().to_string();
    }
    config.build.all_locales |= overrides.all_locales;
    config.build.strict |= overrides.strict;
    if let Some(concurrency) = overrides.concurrency {
        config.build.concurrency = concurrency;
    }

    let cwd = base_dir()?;
    let assembler = Arc::new(PageAssembler::from_config(&config.site, &cwd)?);
    let build_config = BuildConfig::from_config(&config, registry, &cwd);

    info!(
        out_dir = %build_config.out_dir.display(),
        content_dir = %assembler.loader().content_dir().display(),
        locales = build_config.locales.len(),
        strict = build_config.strict,
        "building site"
    );

    let reporter = CliProgress::new();
    let result = pipeline::build_site(assembler, &build_config, &reporter).await?;

    println!();
    println!("  Site built.");
    println!("  Build:   {}", result.build_id);
    println!("  Routes:  {}", result.route_count);
    println!("  Pages:   {}", result.pages_written);
    println!("  Missing: {}", result.missing.len());
    for page in &result.missing {
        println!("           {}", route_path(&page.locale, page.step_id));
    }
    println!("  Path:    {}", result.out_dir.display());
    println!("  Time:    {:.2}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_routes(config: &AppConfig) -> Result<()> {
    let assembler = PageAssembler::from_config(&config.site, &base_dir()?)?;
    println!("{}", pipeline::routes_json(&assembler)?);
    Ok(())
}

fn cmd_show(
    mut config: AppConfig,
    registry: &LocaleRegistry,
    step: &str,
    locale: Option<&str>,
    content: Option<PathBuf>,
) -> Result<()> {
    apply_content_override(&mut config, content);
    let assembler = PageAssembler::from_config(&config.site, &base_dir()?)?;

    let locale = match locale {
        Some(candidate) => registry.resolve(candidate),
        None => registry.default_locale(),
    };

    match assembler.assemble(step, locale) {
        Some(page) => {
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&NotFoundPage::default())?);
            Err(eyre!("step '{step}' not found for locale '{locale}'"))
        }
    }
}

fn cmd_locales(registry: &LocaleRegistry, current: Option<&str>) -> Result<()> {
    for locale in registry.locales() {
        let marker = if locale == registry.default_locale() {
            " (default)"
        } else {
            ""
        };
        println!("{locale}{marker}");
    }

    if let Some(candidate) = current {
        let current = registry.resolve(candidate);
        println!();
        println!("  Current: {current}");
        println!("  Toggle:  {}", registry.other(current));
    }

    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let target = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let path = init_config(&target)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .expect("valid progress template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn page_done(&self, path: &str, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(path.to_string());
    }

    fn done(&self, _result: &BuildResult) {
        self.bar.finish_and_clear();
    }
}
