use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use submission_client::{Client, DEFAULT_ENDPOINT, Error, Issuer, IssuerConfig, Submission};

#[derive(Parser)]
#[command(name = "submit")]
#[command(about = "POST a repository submission to the verification agent", long_about = None)]
struct Cli {
    /// Intake endpoint
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    url: String,

    /// JSON file holding repo_url, participant_summary and sponsor_requirements
    #[arg(short, long)]
    payload: Option<PathBuf>,

    /// Per-request timeout; the HTTP client's default applies when omitted
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "submission_client=warn,submit=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "submission failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = IssuerConfig::new(cli.url);
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    let issuer = Issuer::new(Client::new(), config)?;

    let mut stdout = std::io::stdout().lock();
    let outcome = match cli.payload {
        Some(path) => {
            let bytes = std::fs::read(&path)
                .map_err(|err| Error::payload(format!("{}: {err}", path.display())))?;
            Submission::from_json(&bytes)?;
            issuer.issue_body(bytes, &mut stdout).await?
        }
        None => issuer.issue(&Submission::canonical(), &mut stdout).await?,
    };

    tracing::debug!(
        status = outcome.status,
        bytes = outcome.bytes_written,
        "response written to stdout"
    );
    Ok(())
}
