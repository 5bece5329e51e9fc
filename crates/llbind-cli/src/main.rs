use clap::{Parser, Subcommand};
use llbind_config::CONFIG_FILE;
use miette::{miette, Result};
use std::path::PathBuf;

mod logging;
mod render;
mod run;

#[derive(Parser)]
#[command(name = "llbind")]
#[command(author, version, about = "Symbol and type translation for C/C++ library bindings")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the symbol table for the configured headers
    Symg {
        /// Binding configuration
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,

        /// Symbol table to write (default: next to the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the bindings generated for the configured headers
    Dump {
        /// Binding configuration
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Symg { config, output } => {
            let run = run::generate(&config)?;
            run::report_diagnostics(&run.output);

            let table = run::symbol_table(&run.output);
            let path = output.unwrap_or_else(|| run::symbol_file(&config));
            table
                .write_to(&path)
                .map_err(|e| miette!("Failed to write {}: {}", path.display(), e))?;
            println!(
                "Wrote {} symbols for {} to {}",
                table.len(),
                run.config.name,
                path.display()
            );
        }

        Commands::Dump { config } => {
            let run = run::generate(&config)?;
            run::report_diagnostics(&run.output);

            for file in run.output.package.files() {
                println!("{}", render::render_file(file));
            }
        }
    }

    Ok(())
}
