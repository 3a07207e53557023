use chrono::Utc;
use clap::{Parser, Subcommand};
use pragna_site::booking::{BookingClient, BookingForm};
use pragna_site::cache::CacheManifest;
use pragna_site::scan::Manifest;
use pragna_site::site::Site;
use pragna_site::{config, generate, output, scan, sitemap};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Shared flags for commands that write the site.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Rewrite every output file, even when unchanged since the last build
    #[arg(long)]
    no_cache: bool,
}

/// A booking lead, as the footer form would submit it.
#[derive(clap::Args, Clone)]
struct BookArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    #[arg(long, default_value = "+91")]
    country_code: String,
    #[arg(long)]
    email: String,
    /// punjagutta, kokapet, or another branch name
    #[arg(long)]
    branch: String,
    #[arg(long, default_value = "")]
    concerns: String,
}

fn version_string() -> &'static str {
    let hash = env!("PRAGNA_SITE_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup, called exactly once
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "pragna-site")]
#[command(about = "Static site generator for the Pragna clinic website")]
#[command(long_about = "\
Static site generator for the Pragna clinic website

Content is TOML. Each file is one page; numbered prefixes set listing order.

Content structure:

  content/
  ├── config.toml                  # Site config (optional, sparse overrides)
  ├── navigation.toml              # Menu: pillars → categories → items
  ├── conditions/
  │   └── 010-acne-breakouts.toml  # → /conditions/acne-breakouts
  ├── families/
  │   └── 010-acne-scar-solutions.toml  # → /treatments/acne-scar-solutions
  ├── treatments/
  │   └── chemical-peels.toml      # → /treatments/<family>/chemical-peels
  └── programs/
      └── 010-bridal-glow.toml     # → /signature-programs/bridal-glow

A sub-treatment page exists for every slug a family lists in `sub_treatments`.
Menu hrefs must resolve to exactly one family or sub-treatment.

Run 'pragna-site gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (scan manifest)
    #[arg(long, default_value = ".pragna-site-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Validate references and the navigation menu without building
    Check,
    /// Produce the HTML site from the scan manifest
    Generate(CacheArgs),
    /// Run the full pipeline: scan → check → generate
    Build(CacheArgs),
    /// Print sitemap.xml for the current content
    Sitemap,
    /// Submit a booking lead to the configured endpoint
    Book(BookArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = Site::new(scan::scan(&cli.source)?)?;
            output::print_check_output(&site);
            println!("==> Content is valid");
        }
        Command::Generate(cache_args) => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let manifest: Manifest =
                serde_json::from_str(&std::fs::read_to_string(&manifest_path)?)?;
            let site = Site::new(manifest)?;
            run_generate(&site, &cli.output, &cache_args)?;
        }
        Command::Build(cache_args) => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest);

            println!("==> Stage 2: Checking references and navigation");
            let site = Site::new(manifest)?;
            output::print_check_output(&site);

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            run_generate(&site, &cli.output, &cache_args)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Sitemap => {
            let site = Site::new(scan::scan(&cli.source)?)?;
            let entries = sitemap::build_sitemap(&site, Utc::now());
            print!("{}", sitemap::render_sitemap_xml(&entries));
        }
        Command::Book(args) => {
            let site_config = config::load_config(&cli.source)?;
            let client = BookingClient::new(&site_config.booking)?;
            let form = BookingForm {
                name: args.name,
                phone: args.phone,
                country_code: args.country_code,
                email: args.email,
                branch: args.branch,
                concerns: args.concerns,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let receipt = runtime.block_on(client.submit_form(&form, Utc::now()))?;
            output::print_booking_output(&receipt);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so stage output on stdout stays clean. `RUST_LOG`
/// overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn write_manifest(manifest: &Manifest, temp_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(temp_dir.join("manifest.json"), json)?;
    Ok(())
}

fn run_generate(
    site: &Site,
    output_dir: &Path,
    cache_args: &CacheArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&site.config.build);
    let previous = if cache_args.no_cache {
        CacheManifest::empty()
    } else {
        CacheManifest::load(output_dir)
    };
    let report = generate::generate(site, output_dir, previous, Utc::now())?;
    output::print_generate_output(&report);
    Ok(())
}

/// Initialize the rayon thread pool based on build config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(build: &config::BuildConfig) {
    let threads = config::effective_threads(build);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
