use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use moodle_roster::{
    DEFAULT_SPREADSHEET, ExportRequest, RosterError, SchemaVariant, VariantChoice, cli, config,
};
use owo_colors::OwoColorize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Moodle Roster: turn a Google Sheets roster into a Moodle bulk user upload CSV
#[derive(Parser)]
#[command(name = "roster", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test authorization against Google Sheets
    Auth,

    /// Build the upload CSV from a roster tab
    Export {
        /// Name of the Google Sheets spreadsheet
        #[arg(short, long, default_value = DEFAULT_SPREADSHEET)]
        spreadsheet: String,

        /// Tab holding the roster
        #[arg(short, long, default_value = "")]
        tab: String,

        /// Moodle course short name (e.g. NOME_CURSO_2024)
        #[arg(short, long, default_value = "")]
        course: String,

        /// Moodle group name (e.g. TURMA_A)
        #[arg(short, long, default_value = "")]
        group: String,

        /// Also save the records to this tab (basic layout); an existing tab is overwritten
        #[arg(short, long, conflicts_with = "overwrite")]
        new_tab: Option<String>,

        /// Also replace the source tab with the records (with-role layout)
        #[arg(long)]
        overwrite: bool,

        /// Roster layout of the source tab
        #[arg(long, value_enum, default_value_t = VariantChoice::Auto)]
        variant: VariantChoice,

        /// Directory the CSV file is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Cli::parse();

    let log_level = match args.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if let Err(report) = run(args).await {
        let err = RosterError::classify(&report);
        log::error!("{}", err.red());
        if let RosterError::UnexpectedFailure { .. } = err {
            log::debug!("{:?}", report);
            log::error!(
                "Check the spreadsheet and tab names, and that the roster headers are {} or {}",
                SchemaVariant::Basic.mapping().required_columns().join(", ").yellow(),
                SchemaVariant::WithRole.mapping().required_columns().join(", ").yellow()
            );
        }
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<()> {
    config::load_env(&args.env)?;

    match args.command {
        Commands::Auth => {
            let client = cli::load_sheets_client()?;
            cli::check_auth(&client).await?;
        }
        Commands::Export {
            spreadsheet,
            tab,
            course,
            group,
            new_tab,
            overwrite,
            variant,
            output_dir,
        } => {
            let request = ExportRequest {
                spreadsheet,
                source_tab: tab,
                course,
                group,
                destination: config::destination_from_flags(new_tab, overwrite),
                variant,
                output_dir,
            };
            let client = cli::load_sheets_client()?;

            let report = cli::export(&client, &request).await?;
            log::info!(
                "✓ {} ready: {} record(s), {} layout",
                report.csv_path.display().bright_black(),
                report.records,
                report.variant.cyan()
            );

            match report.write_back {
                Some(Ok(count)) => {
                    log::info!("✓ Wrote {} record(s) back to the spreadsheet", count)
                }
                Some(Err(err)) => return Err(err.into()),
                None => {}
            }
        }
    }

    Ok(())
}
