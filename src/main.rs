extern crate env_logger;
#[macro_use]
extern crate log;

use anyhow::Result;
use clap::Parser;

mod cli;
mod fastqc;
mod file;
mod gencode;

use cli::{Cli, Commands};

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    println!("seqtidy v{}", cli::VERSION);

    match &cli.command {
        Commands::Info { fasta, output } => {
            let nseq = gencode::extract_info(fasta, output)?;
            info!("Wrote transcript info to {output}");
            println!("Found {nseq} Sequences");
        }
        Commands::Clean { fasta, output } => {
            let nseq = gencode::clean_headers(fasta, output)?;
            info!("Wrote cleaned fasta to {output}");
            println!("Found {nseq} Sequences");
        }
        Commands::Qc {
            dir,
            output,
            table_if,
            plot_if,
            max_table_rows,
            keep_going,
            text,
        } => {
            let opts = fastqc::SummaryOptions {
                table_if: table_if.clone(),
                plot_if: plot_if.clone(),
                max_table_rows: *max_table_rows as usize,
                keep_going: *keep_going,
            };

            if *text {
                let stdout = std::io::stdout();
                let mut renderer = fastqc::render::TextRenderer::new(stdout.lock());
                fastqc::summarize(dir, &mut renderer, &opts)?;
            } else {
                let mut renderer = fastqc::render::HtmlRenderer::new(output);
                fastqc::summarize(dir, &mut renderer, &opts)?;
                info!("Wrote report to {output}");
            }
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
