// Batch passport field extraction over image files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use passfield::processing::PreprocessConfig;
use passfield::{DocumentPipeline, ExtractedFields, PipelineConfig, TesseractClient};

#[derive(Parser)]
#[command(
    name = "passfield",
    about = "Extract identity fields from photographed passport images"
)]
struct Args {
    /// Passport images to process, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Recognizer language set
    #[arg(long, default_value = "eng+chi_sim")]
    lang: String,

    /// Emit one JSON array of records instead of the text report
    #[arg(long)]
    json: bool,

    /// Skip the 3x3 mean denoise stage
    #[arg(long)]
    no_denoise: bool,

    /// Skip the sharpen stage
    #[arg(long)]
    no_sharpen: bool,

    /// Capture the legacy date-of-issue field from the visual zone
    #[arg(long)]
    date_of_issue: bool,
}

fn print_field(label: &str, value: &str) {
    println!(
        "  {}: {}",
        label,
        if value.is_empty() { "Not detected" } else { value }
    );
}

fn print_report(path: &Path, fields: &ExtractedFields, include_issue: bool) {
    println!("\n===============================================");
    println!("  {}", path.display());
    println!("===============================================");
    print_field("Passport No", &fields.passport_number);
    print_field("Full Name", &fields.full_name);
    print_field("Date of Birth", &fields.date_of_birth);
    print_field("Place of Birth", &fields.place_of_birth);
    if include_issue {
        print_field("Date of Issue", &fields.date_of_issue);
    }
    print_field("Date of Expiry", &fields.date_of_expiry);
    print_field("Nationality", &fields.nationality);
    print_field("Gender", &fields.gender);
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let recognizer = match TesseractClient::new(&args.lang) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to initialize recognizer: {}", err);
            std::process::exit(1);
        }
    };

    let config = PipelineConfig {
        preprocess: PreprocessConfig {
            denoise: !args.no_denoise,
            sharpen: !args.no_sharpen,
        },
        capture_date_of_issue: args.date_of_issue,
    };
    let mut pipeline = DocumentPipeline::new(recognizer, config);

    let mut records = Vec::new();
    for path in &args.images {
        let raw = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("{}: {}", path.display(), err);
                continue;
            }
        };

        match pipeline.run_document(&raw) {
            Ok(fields) => {
                if args.json {
                    records.push(serde_json::json!({
                        "file": path.display().to_string(),
                        "fields": fields,
                    }));
                } else {
                    print_report(path, &fields, args.date_of_issue);
                }
            }
            Err(err) => eprintln!("{}: {}", path.display(), err),
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&records) {
            Ok(out) => println!("{}", out),
            Err(err) => eprintln!("Failed to encode records: {}", err),
        }
    }

    pipeline.into_recognizer().shutdown();
}
