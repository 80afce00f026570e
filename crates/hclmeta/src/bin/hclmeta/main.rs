mod cli;

use hclmeta::schema::SchemaIndex;
use hclmeta::source_files::SourceFiles;
use serde::Serialize;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLMETA_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Convert(convert_cli) => convert(convert_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn convert(cli: cli::ConvertCommand) -> anyhow::Result<()> {
    let files = load(&cli.input)?;
    let schema = load_schema(&cli.schema)?;

    let (document, errors) = hclmeta::converter::convert(&files, schema.as_ref());

    for issue in errors.issues() {
        let mut source: Option<&dyn std::error::Error> = Some(issue);
        while let Some(error) = source {
            eprintln!("{error}");
            source = error.source();
        }
    }

    output(&cli.output, &document)?;
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<SourceFiles> {
    let mut files = SourceFiles::default();

    if !input.workdir && input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        files.insert(stdin, None)?;
        return Ok(files);
    }

    if input.workdir {
        files.load_directory(&std::env::current_dir()?)?;
    }

    for file_path in &input.files {
        files.load_file(file_path)?;
    }

    for dir_path in &input.directories {
        files.load_directory(dir_path)?;
    }

    anyhow::ensure!(!files.is_empty(), "No files loaded");

    Ok(files)
}

fn load_schema(args: &cli::SchemaArgs) -> anyhow::Result<Option<SchemaIndex>> {
    let Some(path) = &args.schema else {
        if let Some(provider) = &args.provider {
            tracing::debug!(%provider, "no schema given, ignoring provider");
        }
        return Ok(None);
    };

    let index = SchemaIndex::load_file(path, args.provider.as_deref())?;
    Ok(Some(index))
}

fn output(output: &cli::OutputArgs, value: &impl Serialize) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    match (&output.format, output.compact) {
        (cli::OutputFormat::Yaml, _) => serde_yaml::to_writer(stdout, value)?,
        (cli::OutputFormat::Json, true) => {
            serde_json::to_writer(stdout, value)?;
            println!();
        }
        (cli::OutputFormat::Json, false) => {
            serde_json::to_writer_pretty(stdout, value)?;
            println!();
        }
    };

    Ok(())
}

/// (hclmeta-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Documents => {
            let files = load(&cli.input)?;
            println!("{files:#?}");
        }
        Schema => {
            let index = load_schema(&cli.schema)?
                .ok_or_else(|| anyhow::anyhow!("No schema given, use -s/--schema"))?;
            for type_name in index.resource_types() {
                println!("resource {type_name}");
            }
            for type_name in index.data_source_types() {
                println!("data {type_name}");
            }
        }
    }

    Ok(())
}
