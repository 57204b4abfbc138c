//! lambda-api-verify - end-to-end verification for the Lambda API Terraform module

use clap::Parser;

use lambda_api_verify::cli::Cli;
use lambda_api_verify::commands::run::VerificationFailed;
use lambda_api_verify::domain::{ConfigError, VariantError};
use lambda_api_verify::infra::logging::init_tracing;
use lambda_api_verify::output::json::format_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    let ansi = !cli.no_color && console::Term::stderr().is_term();
    if let Err(e) = init_tracing(cli.verbose, ansi) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = cli.run().await {
        let already_reported = e.downcast_ref::<VerificationFailed>().is_some();
        if json {
            if !already_reported {
                match format_error(&format!("{e:#}"), error_code(&e)) {
                    Ok(doc) => println!("{doc}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn error_code(e: &anyhow::Error) -> &'static str {
    if e.downcast_ref::<ConfigError>().is_some() {
        "CONFIG_ERROR"
    } else if e.downcast_ref::<VariantError>().is_some() {
        "INVALID_VARIANT"
    } else {
        "ERROR"
    }
}
