// KYC document check from the command line

use clap::{ArgGroup, Parser};
use kyc_ocr::config::{KycConfig, OcrConfig, DEFAULT_OCR_ENDPOINT};
use kyc_ocr::processing::{ImageSource, TextRecognizer};
use kyc_ocr::validation::IdentityGate;
use kyc_ocr::{KycOutcome, KycPipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kyc-ocr", version, about = "Extract and verify identity fields from an Aadhaar card image")]
#[command(group(ArgGroup::new("input").required(true).args(["url", "file", "data_uri", "text"])))]
struct Cli {
    /// Document image URL
    #[arg(long)]
    url: Option<String>,

    /// Local document image
    #[arg(long)]
    file: Option<PathBuf>,

    /// Inline `data:image/...;base64,` document image
    #[arg(long)]
    data_uri: Option<String>,

    /// Already recognised text; skips image processing and OCR
    #[arg(long)]
    text: Option<String>,

    #[arg(long, env = "OCR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "OCR_ENDPOINT", default_value = DEFAULT_OCR_ENDPOINT)]
    endpoint: String,

    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    language: String,

    #[arg(long, env = "OCR_ENGINE", default_value_t = 2)]
    engine: u8,

    #[arg(long, env = "OCR_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Extra OCR attempts after a transient failure
    #[arg(long, env = "OCR_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    #[arg(long, env = "OCR_RETRY_BACKOFF_MS", default_value_t = 500)]
    retry_backoff_ms: u64,

    #[arg(long, env = "KYC_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Also require a date of birth
    #[arg(long, env = "KYC_REQUIRE_DOB")]
    require_dob: bool,

    /// Also require a gender
    #[arg(long, env = "KYC_REQUIRE_GENDER")]
    require_gender: bool,

    /// Recognise text with the local Tesseract install
    #[cfg(feature = "local-ocr")]
    #[arg(long)]
    local: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self, api_key: String) -> KycConfig {
        KycConfig {
            ocr: OcrConfig {
                endpoint: self.endpoint.clone(),
                api_key,
                language: self.language.clone(),
                engine: self.engine,
                timeout: Duration::from_secs(self.timeout_secs),
                max_retries: self.max_retries,
                retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            },
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            gate: IdentityGate {
                require_date_of_birth: self.require_dob,
                require_gender: self.require_gender,
            },
        }
    }

    fn source(&self) -> Option<ImageSource> {
        if let Some(url) = &self.url {
            Some(ImageSource::Url(url.clone()))
        } else if let Some(path) = &self.file {
            Some(ImageSource::File(path.clone()))
        } else {
            self.data_uri.clone().map(ImageSource::DataUri)
        }
    }
}

async fn check<R: TextRecognizer>(pipeline: &KycPipeline<R>, cli: &Cli) -> KycOutcome {
    match (&cli.text, cli.source()) {
        (Some(text), _) => pipeline.run_text(text.as_str()),
        (None, Some(source)) => pipeline.run(source).await,
        (None, None) => KycOutcome::rejected("No document input given"),
    }
}

fn print_report(outcome: &KycOutcome) {
    println!("\n===============================================");
    println!("         KYC DOCUMENT VERIFICATION REPORT");
    println!("===============================================\n");

    match outcome {
        KycOutcome::Accepted { data, .. } => {
            let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
            println!("  ID Number: {}", data.masked_id_number().unwrap_or_else(|| "-".to_string()));
            println!("  Name: {}", show(&data.name));
            println!("  Date of Birth: {}", show(&data.date_of_birth));
            println!(
                "  Gender: {}",
                data.gender.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string())
            );
            println!("\nKYC result: ACCEPTED");
        }
        KycOutcome::Rejected { error } => {
            println!("  Error: {}", error);
            println!("\nKYC result: REJECTED");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // The OCR key is only needed when an image has to be recognised
    let api_key = match (&cli.api_key, &cli.text) {
        (Some(key), _) => key.clone(),
        (None, Some(_)) => String::new(),
        #[cfg(feature = "local-ocr")]
        (None, None) if cli.local => String::new(),
        (None, None) => {
            eprintln!("Error: OCR_API_KEY (or --api-key) is required for image input");
            return ExitCode::from(2);
        }
    };
    let config = cli.config(api_key);

    #[cfg(feature = "local-ocr")]
    let outcome = if cli.local {
        match kyc_ocr::processing::ImageFetcher::new(config.fetch_timeout) {
            Ok(fetcher) => {
                let recognizer = kyc_ocr::processing::TesseractRecognizer::new(config.ocr.language.clone());
                let pipeline = KycPipeline::new(fetcher, recognizer, config.gate);
                Some(check(&pipeline, &cli).await)
            }
            Err(e) => Some(KycOutcome::rejected(e.to_string())),
        }
    } else {
        None
    };
    #[cfg(not(feature = "local-ocr"))]
    let outcome: Option<KycOutcome> = None;

    let outcome = match outcome {
        Some(outcome) => outcome,
        None => match KycPipeline::from_config(config) {
            Ok(pipeline) => check(&pipeline, &cli).await,
            Err(e) => KycOutcome::rejected(e.to_string()),
        },
    };

    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serialising result: {}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        print_report(&outcome);
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
