//! incomeclass CLI binary.
//!
//! Serves the prediction form and runs predictions from the command line.

mod config;
mod telemetry;
mod web;

use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use incomeclass::output::{DOWNLOAD_FILE_NAME, ReportFormat};
use incomeclass::{
    BatchTable, CategoricalField, EncodingSchema, FeatureRecord, IncomeBracket, PredictionService,
    ServiceError, UnknownLabelPolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

/// Rows sent to the model per progress step.
const BATCH_CHUNK_ROWS: usize = 256;

#[derive(Parser)]
#[command(name = "incomeclass")]
#[command(about = "incomeclass: Employee income bracket classifier", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact (overrides the config file)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Encoding schema file (overrides the config file)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Unknown label handling: reject or fallback
    #[arg(long, global = true)]
    unknown_labels: Option<UnknownLabelPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the prediction form and HTTP API
    Serve {
        /// Listen address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Predict the income bracket of one employee
    Predict {
        #[command(flatten)]
        record: PredictArgs,

        /// Output format (text, json or pretty-json)
        #[arg(long, default_value = "text")]
        format: ReportFormat,
    },

    /// Predict every row of a CSV file
    Batch {
        /// Input CSV with the 13 feature columns
        input: PathBuf,

        /// Output CSV
        #[arg(long, short, default_value = DOWNLOAD_FILE_NAME)]
        output: PathBuf,
    },

    /// Show the categorical encoding tables
    Schema {
        /// Only show one field
        #[arg(long)]
        field: Option<CategoricalField>,

        /// Print the schema artifact as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Feature values for `predict`; every field defaults to the form default.
#[derive(Args)]
struct PredictArgs {
    /// Age in years (18-65)
    #[arg(long, default_value_t = 30)]
    age: i64,

    /// Employer type
    #[arg(long, default_value = "Private")]
    workclass: String,

    /// Census final weight (10000-1000000)
    #[arg(long, default_value_t = 50_000)]
    fnlwgt: i64,

    /// Education level (1-16)
    #[arg(long, default_value_t = 10)]
    educational_num: i64,

    /// Marital status
    #[arg(long, default_value = "Never-married")]
    marital_status: String,

    /// Job role
    #[arg(long, default_value = "Tech-support")]
    occupation: String,

    /// Household relationship
    #[arg(long, default_value = "Wife")]
    relationship: String,

    /// Race
    #[arg(long, default_value = "White")]
    race: String,

    /// Gender
    #[arg(long, default_value = "Male")]
    gender: String,

    /// Capital gain (0-100000)
    #[arg(long, default_value_t = 0)]
    capital_gain: i64,

    /// Capital loss (0-5000)
    #[arg(long, default_value_t = 0)]
    capital_loss: i64,

    /// Hours worked per week (1-80)
    #[arg(long, default_value_t = 40)]
    hours_per_week: i64,

    /// Country of origin
    #[arg(long, default_value = "United-States")]
    native_country: String,
}

impl From<PredictArgs> for FeatureRecord {
    fn from(args: PredictArgs) -> Self {
        Self {
            age: args.age,
            workclass: args.workclass,
            fnlwgt: args.fnlwgt,
            educational_num: args.educational_num,
            marital_status: args.marital_status,
            occupation: args.occupation,
            relationship: args.relationship,
            race: args.race,
            gender: args.gender,
            capital_gain: args.capital_gain,
            capital_loss: args.capital_loss,
            hours_per_week: args.hours_per_week,
            native_country: args.native_country,
        }
    }
}

#[tokio::main]
async fn main() {
    telemetry::init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.model,
        cli.schema,
        cli.unknown_labels,
    );

    match cli.command {
        Commands::Serve { bind } => {
            let config = match bind {
                Some(bind_addr) => AppConfig {
                    bind_addr,
                    ..config
                },
                None => config,
            };
            serve(&config).await?;
        }
        Commands::Predict { record, format } => {
            predict(&config, record.into(), format)?;
        }
        Commands::Batch { input, output } => {
            batch(&config, &input, &output)?;
        }
        Commands::Schema { field, json } => {
            show_schema(&config, field, json)?;
        }
    }

    Ok(())
}

async fn serve(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;

    print!("Loading model from {}...", config.model_path.display());
    let service = PredictionService::load(&config.service())?;
    println!(" ✓ ({})", service.model().name());

    let state = Arc::new(web::AppState {
        service,
        max_upload_bytes: config.max_upload_bytes,
    });
    let (local_addr, server) = web::bind(addr, state, web::shutdown_signal())?;
    println!("Prediction form available at http://{}/", local_addr);
    println!("Press Ctrl+C to stop.");

    server.await?;
    println!("Server stopped.");
    Ok(())
}

fn predict(
    config: &AppConfig,
    record: FeatureRecord,
    format: ReportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let problems = web::form::check_bounds(&record);
    if !problems.is_empty() {
        return Err(problems.join("; ").into());
    }

    let service = PredictionService::load(&config.service())?;
    let report = service.report(record)?;
    println!("{}", report.render(format)?);
    Ok(())
}

fn batch(config: &AppConfig, input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "BATCH INCOME PREDICTION");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    print!("Loading model from {}...", config.model_path.display());
    let service = PredictionService::load(&config.service())?;
    println!(" ✓ ({})", service.model().name());

    print!("Reading {}...", input.display());
    let table = BatchTable::from_path(input)?;
    let records = table.feature_records()?;
    println!(" ✓ ({} rows)", records.len());

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.set_message("Predicting...");

    let mut brackets = Vec::with_capacity(records.len());
    for (chunk_index, chunk) in records.chunks(BATCH_CHUNK_ROWS).enumerate() {
        let offset = chunk_index * BATCH_CHUNK_ROWS;
        let predictions = match service.predict_records(chunk) {
            Ok(predictions) => predictions,
            Err(e) => {
                pb.finish_with_message("Failed!");
                return Err(offset_row(e, offset).into());
            }
        };
        brackets.extend(predictions.iter().map(|p| p.bracket));
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message(format!("Predicted {} rows", brackets.len()));

    let above = brackets
        .iter()
        .filter(|b| **b == IncomeBracket::Above)
        .count();

    print!("Writing {}...", output.display());
    table.with_predictions(&brackets)?.write_to_path(output)?;
    println!(" ✓");

    println!("\nSummary");
    println!("{}", "─".repeat(40));
    println!("{:<28} {:>11}", IncomeBracket::Above.to_string(), above);
    println!(
        "{:<28} {:>11}",
        IncomeBracket::AtOrBelow.to_string(),
        brackets.len() - above
    );

    Ok(())
}

/// Shift a chunk-relative row number to its position in the whole table.
fn offset_row(error: ServiceError, offset: usize) -> ServiceError {
    match error {
        ServiceError::EncodeRow { row, source } => ServiceError::EncodeRow {
            row: row + offset,
            source,
        },
        other => other,
    }
}

fn show_schema(
    config: &AppConfig,
    field: Option<CategoricalField>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = match &config.schema_path {
        Some(path) => EncodingSchema::from_path(path)?,
        None => EncodingSchema::builtin(),
    };

    if json {
        println!("{}", schema.to_json()?);
        return Ok(());
    }

    println!("Encoding schema version {}", schema.version);
    let fields = match field {
        Some(field) => vec![field],
        None => CategoricalField::all().to_vec(),
    };

    for field in fields {
        let Some(table) = schema.table(field) else {
            continue;
        };

        println!("\n{} ({})", field.caption(), field);
        println!("{}", "─".repeat(40));
        for entry in &table.entries {
            let marker = if table.fallback.as_deref() == Some(entry.label.as_str()) {
                " (fallback)"
            } else {
                ""
            };
            println!("{:<28} {:>4}{}", entry.label, entry.code, marker);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use incomeclass::schema::EncodeError;

    #[test]
    fn test_predict_defaults_match_form_defaults() {
        let cli = Cli::parse_from(["incomeclass", "predict"]);
        let Commands::Predict { record, format } = cli.command else {
            panic!("expected predict command");
        };
        assert_eq!(FeatureRecord::from(record), FeatureRecord::default());
        assert_eq!(format, ReportFormat::Text);
    }

    #[test]
    fn test_predict_flags() {
        let cli = Cli::parse_from([
            "incomeclass",
            "predict",
            "--age",
            "45",
            "--native-country",
            "Canada",
            "--hours-per-week",
            "60",
            "--format",
            "json",
            "--unknown-labels",
            "fallback",
        ]);
        assert_eq!(cli.unknown_labels, Some(UnknownLabelPolicy::Fallback));
        let Commands::Predict { record, format } = cli.command else {
            panic!("expected predict command");
        };
        let record = FeatureRecord::from(record);
        assert_eq!(record.age, 45);
        assert_eq!(record.native_country, "Canada");
        assert_eq!(record.hours_per_week, 60);
        assert_eq!(format, ReportFormat::Json);
    }

    #[test]
    fn test_batch_default_output() {
        let cli = Cli::parse_from(["incomeclass", "batch", "employees.csv"]);
        let Commands::Batch { input, output } = cli.command else {
            panic!("expected batch command");
        };
        assert_eq!(input, PathBuf::from("employees.csv"));
        assert_eq!(output, PathBuf::from("predicted_classes.csv"));
    }

    #[test]
    fn test_schema_field_flag() {
        let cli = Cli::parse_from(["incomeclass", "schema", "--field", "native-country"]);
        let Commands::Schema { field, json } = cli.command else {
            panic!("expected schema command");
        };
        assert_eq!(field, Some(CategoricalField::NativeCountry));
        assert!(!json);
    }

    #[test]
    fn test_offset_row() {
        let error = ServiceError::EncodeRow {
            row: 3,
            source: EncodeError::UnknownLabel {
                field: CategoricalField::Workclass,
                label: "Freelance".to_string(),
            },
        };
        let shifted = offset_row(error, 512);
        assert_eq!(
            shifted.to_string(),
            "Row 515: Unknown workclass label 'Freelance'"
        );
    }

    #[test]
    fn test_predict_rejects_out_of_range() {
        let record = FeatureRecord {
            age: 90,
            ..FeatureRecord::default()
        };
        let err = predict(&AppConfig::default(), record, ReportFormat::Text).unwrap_err();
        assert_eq!(err.to_string(), "Age must be between 18 and 65, got 90");
    }
}
