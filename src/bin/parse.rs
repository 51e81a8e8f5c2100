use anyhow::Result;
use clap::Parser;
use legalkg::ingest::{LoaderRegistry, Pipeline, FolderNaming};
use legalkg::{Config, StructureParser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parse")]
#[command(about = "Parse one legal document and print its content units as JSON")]
struct Args {
    /// Document file (.docx or already extracted .txt)
    file: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "warn")
    ).init();

    let args = Args::parse();

    // A config file is optional here; without one the default markers apply
    let pipeline = match Config::load() {
        Ok(config) => Pipeline::from_config(&config)?,
        Err(e) => {
            log::debug!("No usable configuration ({}), using defaults", e);
            Pipeline {
                loaders: LoaderRegistry::new(),
                parser: StructureParser::default(),
                naming: FolderNaming::new("demuc", "vanban")?,
            }
        }
    };

    match pipeline.parse_file(&args.file) {
        Ok(units) => {
            println!("{}", serde_json::to_string_pretty(&units)?);
            Ok(())
        }
        Err(reason) => anyhow::bail!("No result for {}: {}", args.file.display(), reason),
    }
}
