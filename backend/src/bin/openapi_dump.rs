//! Print the OpenAPI document as JSON or YAML.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use agriscope_backend::doc::ApiDoc;
use clap::{Parser, ValueEnum};
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "openapi-dump",
    about = "Print the AgriScope OpenAPI document",
    version
)]
struct CliArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn render(format: Format) -> io::Result<String> {
    let doc = ApiDoc::openapi();
    match format {
        Format::Json => doc.to_pretty_json().map_err(io::Error::other),
        Format::Yaml => doc.to_yaml().map_err(io::Error::other),
    }
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();
    println!("{}", render(args.format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Format::Json, "\"/api/indices/calculate\"")]
    #[case(Format::Yaml, "/api/indices/calculate:")]
    fn renders_documented_paths(#[case] format: Format, #[case] needle: &str) {
        let rendered = render(format).expect("document renders");
        assert!(rendered.contains(needle), "{rendered}");
    }

    #[rstest]
    fn format_defaults_to_json() {
        let args = CliArgs::try_parse_from(["openapi-dump"]).expect("defaults parse");
        assert!(matches!(args.format, Format::Json));
    }
}
