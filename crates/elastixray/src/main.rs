//! CLI for `elastixray`.
//!
//! ```text
//! # Show how every analyzed field of document 42 is tokenized
//! elastixray -c https://localhost:9200 -a http_ca.crt -x books -i 42
//!
//! # Same, cluster settings from a file, machine-readable output
//! elastixray --config elastixray.yaml -x books -i 42 --format json
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use elastixray::report::{self, ReportFormat};
use elastixray::{ClientOptions, EsClient, Error, RunOptions, XrayConfig};

/// Show how the analyzers of an index tokenize the fields of one document.
#[derive(Parser)]
#[command(name = "elastixray", version, about)]
struct Cli {
    /// The cluster to connect to (e.g., `https://localhost:9200`).
    #[arg(short, long)]
    cluster: Option<String>,

    /// Path to the root CA certificate of the cluster (PEM).
    #[arg(short = 'a', long)]
    ca: Option<PathBuf>,

    /// The index of the document to analyze.
    #[arg(short = 'x', long)]
    index: Option<String>,

    /// The ID of the document to analyze.
    #[arg(short, long)]
    id: Option<String>,

    /// Path to a config YAML file. CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Maximum number of `_analyze` calls in flight.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Text analyzed for fields without a sample value.
    #[arg(long)]
    placeholder: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Increase log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` wins.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => XrayConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => XrayConfig::default(),
    };
    let config = apply_cli_overrides(config, &cli);

    let cluster = config.require_cluster()?;
    let (index, id) = document_target(&cli)?;

    let client = EsClient::with_options(cluster, &ClientOptions::from_config(&config))
        .with_context(|| format!("Failed to set up client for {cluster}"))?;
    let options = RunOptions::new().with_config(&config);

    let inspection = elastixray::inspect(&client, index, id, &options).await?;

    print!("{}", report::render(&inspection, cli.format)?);

    if !inspection.failures.is_empty() {
        eprintln!(
            "{} analysis call(s) failed for document {id}:",
            inspection.failures.len()
        );
        for failure in &inspection.failures {
            eprintln!("  {failure}: {}", failure.source);
        }
    }

    Ok(())
}

/// Apply CLI flags that override config file values.
fn apply_cli_overrides(mut config: XrayConfig, cli: &Cli) -> XrayConfig {
    if let Some(cluster) = &cli.cluster {
        config.cluster = Some(cluster.clone());
    }
    if let Some(ca) = &cli.ca {
        config.ca = Some(ca.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(placeholder) = &cli.placeholder {
        config.placeholder_text.clone_from(placeholder);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    config
}

/// Index and document ID; both are required.
fn document_target(cli: &Cli) -> Result<(&str, &str), Error> {
    const HINT: &str = "make sure to specify a document using the -x and -i switches";

    let index = cli.index.as_deref().ok_or(Error::Config {
        parameter: "index",
        hint: HINT,
    })?;
    let id = cli.id.as_deref().ok_or(Error::Config {
        parameter: "document ID",
        hint: HINT,
    })?;
    Ok((index, id))
}

/// Log to stderr so reports on stdout stay clean.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("elastixray").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn short_switches() {
        let cli = parse(&["-c", "http://es:9200", "-a", "ca.pem", "-x", "books", "-i", "42"]);
        assert_eq!(cli.cluster.as_deref(), Some("http://es:9200"));
        assert_eq!(cli.ca, Some(PathBuf::from("ca.pem")));
        assert_eq!(document_target(&cli).unwrap(), ("books", "42"));
        assert_eq!(cli.format, ReportFormat::Text);
    }

    #[test]
    fn format_flag() {
        let cli = parse(&["-x", "books", "-i", "1", "--format", "json"]);
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn missing_document_is_config_error() {
        let cli = parse(&["-c", "http://es:9200", "-x", "books"]);
        let err = document_target(&cli).unwrap_err();
        assert!(matches!(err, Error::Config { parameter: "document ID", .. }));

        let cli = parse(&["-c", "http://es:9200"]);
        let err = document_target(&cli).unwrap_err();
        assert!(matches!(err, Error::Config { parameter: "index", .. }));
    }

    #[test]
    fn missing_cluster_is_config_error() {
        let cli = parse(&["-x", "books", "-i", "1"]);
        let config = apply_cli_overrides(XrayConfig::default(), &cli);
        assert!(config.require_cluster().is_err());
    }

    #[test]
    fn cli_overrides_config() {
        let file = XrayConfig {
            cluster: Some("http://from-file:9200".into()),
            concurrency: 2,
            timeout_secs: 10,
            ..XrayConfig::default()
        };
        let cli = parse(&[
            "-c",
            "http://from-cli:9200",
            "--concurrency",
            "8",
            "--placeholder",
            "filler",
        ]);

        let config = apply_cli_overrides(file, &cli);
        assert_eq!(config.require_cluster().unwrap(), "http://from-cli:9200");
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.placeholder_text, "filler");
        // Untouched by CLI
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_values_survive_without_flags() {
        let file = XrayConfig {
            cluster: Some("http://from-file:9200".into()),
            ca: Some(PathBuf::from("/etc/ca.pem")),
            ..XrayConfig::default()
        };
        let config = apply_cli_overrides(file, &parse(&[]));
        assert_eq!(config.require_cluster().unwrap(), "http://from-file:9200");
        assert_eq!(config.ca, Some(PathBuf::from("/etc/ca.pem")));
    }

    #[test]
    fn log_levels() {
        assert_eq!(default_log_level(0), "warn");
        assert_eq!(default_log_level(1), "debug");
        assert_eq!(default_log_level(5), "trace");
    }
}
