mod cli;
mod info_cmd;
mod page_range;
mod shared;
mod tables_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Tables {
            ref file,
            ref pages,
            format,
            mode,
            min_confidence,
            min_rows,
            min_cols,
            no_merge_cells,
        } => tables_cmd::run(&tables_cmd::TablesArgs {
            file,
            pages: pages.as_deref(),
            format,
            mode,
            min_confidence,
            min_rows,
            min_cols,
            no_merge_cells,
        }),
        cli::Commands::Info {
            ref file,
            ref pages,
        } => info_cmd::run(file, pages.as_deref()),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
