use clap::{Parser, Subcommand};
use simple_book::hooks::LogHooks;
use simple_book::render::HtmlRenderer;
use simple_book::{config, output, site, stage};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "simple-book")]
#[command(about = "Static site generator for documentation sites made of books")]
#[command(long_about = "\
Static site generator for documentation sites made of books

The site is a directory with an index page and a nav.md. Every entry of the
first menu in nav.md that points into a directory is a book, with its own
index page and a summary.md table of contents.

Content structure:

  docs/
  ├── config.toml          # Site config (optional)
  ├── index.md             # Home page (index.md, index.tera or index.html)
  ├── nav.md               # Menus: * [Guide](/guide/index.md)
  └── guide/               # Book
      ├── index.md         # Book home
      ├── summary.md       # * [Chapter 1](chapter1.md)
      └── chapter1.md

Sources are copied into the output directory and built there; nav.md and
summary.md are consumed by the build.

Run 'simple-book gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Source directory
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "_site", global = true)]
    output: PathBuf,

    /// Log pipeline details (hooks, queued and rendered pages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy the sources into the output directory and generate the site
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", output::format_error(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);

            let copied = stage::stage_sources(&cli.source, &cli.output)?;
            log::info!("staged {copied} file(s) into {}", cli.output.display());

            let (tx, rx) = std::sync::mpsc::channel();
            let output_root = cli.output.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_build_event(&event, &output_root);
                }
            });
            let result = site::generate_site(
                &cli.output,
                &site_config,
                &LogHooks,
                &HtmlRenderer::new(),
                Some(tx),
            );
            // The sender is gone once generate_site returns, so the printer drains and exits.
            printer.join().ok();
            result?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
