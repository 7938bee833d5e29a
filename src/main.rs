use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use json2arxml::converter::{Converter, ConverterOptions, DEFAULT_ROOT_TOKEN};
use json2arxml::generator::{DEFAULT_INDENT, generate_arxml, write_arxml_file};
use json2arxml::parser::{FsSource, load_input};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a JSON configuration tree to ARXML containers", long_about = None)]
struct Cli {
    /// JSON input file
    #[arg(value_name = "INPUT")]
    input: Utf8PathBuf,

    /// ARXML output file (defaults to INPUT with an .arxml extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<Utf8PathBuf>,

    /// Prefix of every DEFINITION-REF
    #[arg(long, default_value = DEFAULT_ROOT_TOKEN)]
    root_token: String,

    /// Container level wrapped in SUB-CONTAINERS (1 = children of the root, 0 = never)
    #[arg(long, default_value_t = 1)]
    sub_containers_level: usize,

    /// Spaces per indentation level
    #[arg(long, default_value_t = DEFAULT_INDENT)]
    indent: usize,

    /// Fail with a non-zero exit status if any entry was skipped
    #[arg(long)]
    strict: bool,

    /// Print skipped entries as JSON on stdout
    #[arg(long, conflicts_with = "stdout")]
    diagnostics_json: bool,

    /// Print the ARXML document on stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Log debug information to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("arxml"));
    if !cli.stdout && output == cli.input {
        bail!("Output path {} would overwrite the input", output);
    }

    let doc = load_input(&mut FsSource, &cli.input)?;
    let options = ConverterOptions {
        root_token: cli.root_token.clone(),
        sub_containers_level: cli.sub_containers_level,
    };
    let conversion = Converter::with_options(options).convert(&doc);

    if cli.stdout {
        print!("{}", generate_arxml(&conversion.root, cli.indent));
    } else {
        write_arxml_file(&conversion.root, cli.indent, &output)
            .with_context(|| format!("Failed to convert {}", cli.input))?;
        tracing::info!(
            input = %cli.input,
            output = %output,
            containers = conversion.container_count(),
            skipped = conversion.diagnostics.len(),
            "converted"
        );
    }

    if cli.diagnostics_json {
        let json = serde_json::to_string_pretty(&conversion.diagnostics)?;
        println!("{}", json);
    }

    if cli.strict && !conversion.diagnostics.is_empty() {
        bail!(
            "{} input entries were skipped",
            conversion.diagnostics.len()
        );
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
