//! `phab` reconciles stellar and planetary parameters across archives.
//!
//! **Usage:**
//! ```text
//! phab enrich --input systems.tbl --table gaiadr3.astrophysical_parameters \
//!     --params teff_gspphot,mass_flame --id-version dr3 --output enriched.tbl
//! phab merge ./data --output merged.tbl
//! phab dedup merged.tbl --output uniques.tbl
//! phab drop-meaningless merged.tbl --output meaningful.tbl --indicator st_teff
//! phab outliers enriched.tbl --column teff_gspphot --join
//! ```
//!
//! Set `PHAB_DEBUG=1` for debug logs.
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::info;

use phab::constants::{
    DEFAULT_FALLBACK_PREFIXES, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_NAME_COLUMN,
    DEFAULT_NEIGHBOUR_SPAN, DEFAULT_OUTLIER_SIGMA, GAIA_CATALOGUE, GAIA_ID_COLUMN,
};
use phab::datasets::table_file::{merge_tables_from_directory, open_table, save_table};
use phab::datasets::{deduplicate_table, drop_meaningless_rows};
use phab::env_state::PhabEnv;
use phab::logs::init_logging;
use phab::phab_errors::PhabError;
use phab::simbad::{IdentifierResolver, ResolverConfig};
use phab::statistics::find_outliers_in_column;
use phab::tap::{ArchiveClient, ServiceRegistry, TapService};
use phab::tasks::reconfirming_stellar_parameters::{enrich, EnrichmentRequest};

#[derive(Parser)]
#[command(name = "phab", about = "Multi-catalog stellar and planetary parameters")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add parameters from an archive to a dataset, as new columns
    Enrich {
        /// Dataset to enrich
        #[arg(long)]
        input: Utf8PathBuf,
        /// Where to save the enriched dataset
        #[arg(long)]
        output: Utf8PathBuf,
        /// Archive table holding the parameters
        #[arg(long)]
        table: String,
        /// Parameters to fetch
        #[arg(long, value_delimiter = ',', required = true)]
        params: Vec<String>,
        /// Archive to query: nasa, padc, gaia or simbad
        #[arg(long, default_value = "gaia")]
        service: TapService,
        /// Override the endpoint of the queried archive
        #[arg(long)]
        endpoint: Option<String>,
        /// Catalogue name in SIMBAD identifiers
        #[arg(long, default_value = GAIA_CATALOGUE)]
        id_catalogue: String,
        /// Catalogue version in SIMBAD identifiers, like dr3
        #[arg(long)]
        id_version: Option<String>,
        /// Archive column holding the identifier
        #[arg(long, default_value = GAIA_ID_COLUMN)]
        id_column: String,
        /// Dataset column holding the star names
        #[arg(long, default_value = DEFAULT_NAME_COLUMN)]
        name_column: String,
        /// Disable the LIKE fallback of SIMBAD resolution
        #[arg(long)]
        no_fallback: bool,
        /// HTTP timeout, in seconds
        #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Merge all the dataset files of a directory
    Merge {
        directory: Utf8PathBuf,
        /// Where to save the merged dataset
        #[arg(long)]
        output: Utf8PathBuf,
    },

    /// Remove duplicated rows, or keep only them
    Dedup {
        input: Utf8PathBuf,
        #[arg(long)]
        output: Utf8PathBuf,
        /// Keep the duplicates instead of the unique rows
        #[arg(long)]
        duplicates: bool,
    },

    /// Remove rows repeating the first row of the dataset
    DropMeaningless {
        input: Utf8PathBuf,
        #[arg(long)]
        output: Utf8PathBuf,
        /// Only compare this column
        #[arg(long)]
        indicator: Option<String>,
    },

    /// Print the index labels of the outliers of a column
    Outliers {
        input: Utf8PathBuf,
        #[arg(long)]
        column: String,
        #[arg(long, default_value_t = DEFAULT_OUTLIER_SIGMA)]
        sigma: f64,
        /// Also flag the points between close outliers
        #[arg(long)]
        join: bool,
        #[arg(long, default_value_t = DEFAULT_NEIGHBOUR_SPAN)]
        span: usize,
    },
}

fn main() -> Result<(), PhabError> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Enrich {
            input,
            output,
            table,
            params,
            service,
            endpoint,
            id_catalogue,
            id_version,
            id_column,
            name_column,
            no_fallback,
            timeout,
        } => {
            let mut registry = ServiceRegistry::default();
            if let Some(endpoint) = endpoint {
                registry = registry.with_endpoint(service, &endpoint);
            }
            let client = ArchiveClient::new(
                registry,
                PhabEnv::with_timeout(Duration::from_secs(timeout)),
            );
            let resolver = IdentifierResolver::with_config(
                &client,
                ResolverConfig::new(DEFAULT_FALLBACK_PREFIXES, !no_fallback, true),
            );
            let request = EnrichmentRequest {
                service,
                table,
                parameters: params,
                id_catalogue,
                id_version,
                id_column,
                name_column,
            };
            let (enriched, report) = enrich(&resolver, open_table(&input)?, &request)?;
            save_table(&enriched, &output)?;
            println!("{report}");
        }
        Command::Merge { directory, output } => {
            merge_tables_from_directory(&directory, Some(output.as_path()))?;
            info!("Merged tables saved to [{output}]");
        }
        Command::Dedup {
            input,
            output,
            duplicates,
        } => {
            let table = deduplicate_table(&open_table(&input)?, !duplicates);
            save_table(&table, &output)?;
            println!("{} rows", table.len());
        }
        Command::DropMeaningless {
            input,
            output,
            indicator,
        } => {
            let table = drop_meaningless_rows(&open_table(&input)?, indicator.as_deref())?;
            save_table(&table, &output)?;
            println!("{} rows", table.len());
        }
        Command::Outliers {
            input,
            column,
            sigma,
            join,
            span,
        } => {
            let mask = find_outliers_in_column(&open_table(&input)?, &column, sigma, join, span)?;
            for (label, _) in mask.into_iter().filter(|(_, outlier)| *outlier) {
                println!("{label}");
            }
        }
    }
    Ok(())
}
