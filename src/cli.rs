use std::path::PathBuf;

use clap::Parser;

use crate::{
    config::{App, SymbolSource},
    declare::EmptyMonthPolicy,
};

/// Backfill daily trading records of TWSE listed stocks into CSV files.
#[derive(Parser, Debug)]
#[command(name = "twse_history", version)]
pub struct Cli {
    /// Stock symbol to fetch.
    #[arg(
        short = 's',
        long = "stock",
        visible_alias = "stock-number",
        default_value = "0050"
    )]
    pub stock: String,

    /// Output directory. Defaults to ./data.
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Seconds to wait after every request. Defaults to 5.
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Newline-delimited list of symbols; fetches each of them in turn.
    #[arg(short = 'f', long, conflicts_with = "batch")]
    pub file: Option<PathBuf>,

    /// Fetch the symbol list from the configuration.
    #[arg(long, default_value_t = false)]
    pub batch: bool,

    /// Oldest year to walk back to. Defaults to 1900.
    #[arg(long)]
    pub floor_year: Option<i32>,

    /// Skip months without data instead of stopping at the first one.
    #[arg(long, default_value_t = false)]
    pub keep_walking: bool,
}

impl Cli {
    /// CLI flags win over env and app.json
    pub fn override_app(&self, mut app: App) -> App {
        if let Some(dir) = &self.output_dir {
            app.backfill.output_dir = dir.clone();
        }

        if let Some(secs) = self.interval {
            app.backfill.interval_secs = secs;
        }

        if let Some(year) = self.floor_year {
            app.backfill.floor_year = year;
        }

        if self.keep_walking {
            app.backfill.empty_month = EmptyMonthPolicy::Continue;
        }

        app
    }

    pub fn symbol_source(&self, app: &App) -> SymbolSource {
        if let Some(file) = &self.file {
            SymbolSource::FileList(file.clone())
        } else if self.batch {
            SymbolSource::Batch(app.backfill.symbols.clone())
        } else {
            SymbolSource::Single(self.stock.trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["twse_history"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        let app = cli.override_app(App::default());

        assert_eq!(cli.symbol_source(&app), SymbolSource::Single("0050".to_string()));
        assert_eq!(app.backfill.interval_secs, 5);
        assert_eq!(app.backfill.output_dir, PathBuf::from("data"));
        assert_eq!(app.backfill.empty_month, EmptyMonthPolicy::Stop);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "--stock-number",
            "2330",
            "-o",
            "out",
            "-i",
            "2",
            "--floor-year",
            "1990",
            "--keep-walking",
        ]);
        let app = cli.override_app(App::default());

        assert_eq!(cli.symbol_source(&app), SymbolSource::Single("2330".to_string()));
        assert_eq!(app.backfill.output_dir, PathBuf::from("out"));
        assert_eq!(app.backfill.interval_secs, 2);
        assert_eq!(app.backfill.floor_year, 1990);
        assert_eq!(app.backfill.empty_month, EmptyMonthPolicy::Continue);
    }

    #[test]
    fn test_symbol_sources() {
        let app = App::default();

        let cli = parse(&["-f", "symbols.txt"]);
        assert_eq!(
            cli.symbol_source(&app),
            SymbolSource::FileList(PathBuf::from("symbols.txt"))
        );

        let cli = parse(&["--batch"]);
        assert_eq!(
            cli.symbol_source(&app),
            SymbolSource::Batch(app.backfill.symbols.clone())
        );
    }

    #[test]
    fn test_file_conflicts_with_batch() {
        assert!(Cli::try_parse_from(["twse_history", "-f", "a.txt", "--batch"]).is_err());
    }
}
