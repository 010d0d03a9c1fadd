use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info, span, Instrument, Level};
use tracing_subscriber::EnvFilter;

use cstorage::{
    util::backend::{parse_backend_from_uri, parse_bucket_from_uri},
    Context, CreateBucketInput, DeleteObjectInput, DeletePrefixInput, GcsOptions, ListOptions,
    MimeType, PutObjectInput, Storage, StorageBackend,
};

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Storage(#[from] cstorage::Error),

    #[error("invalid file name: {}", .0.display())]
    FileName(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{failed} of {total} items failed")]
    Batch { failed: usize, total: usize },
}

type Result<T> = std::result::Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "cstorage", version, about = "Object storage over S3 and GCS")]
struct Cli {
    /// Bucket URI, s3://bucket or gs://bucket
    bucket: String,

    /// Abort the command after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Service account key file for GCS
    #[arg(long, global = true, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the bucket
    CreateBucket {
        /// GCS project owning the bucket
        #[arg(long, default_value = "")]
        project: String,
        /// Region (S3) or location (GCS)
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Delete the bucket, which must be empty
    DeleteBucket,
    /// Upload files, keyed by `prefix` + file name
    Put {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "")]
        prefix: String,
        /// Content type; guessed from the extension when absent
        #[arg(long)]
        mime: Option<MimeType>,
    },
    /// Print an object's content
    Get { key: String },
    /// Print an object's public URL
    Url { key: String },
    /// List objects
    List {
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        delimiter: Option<String>,
    },
    /// Delete objects by key
    Rm {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Delete every object under each prefix
    RmPrefix {
        #[arg(required = true)]
        prefixes: Vec<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::CreateBucket { .. } => "create-bucket",
            Command::DeleteBucket => "delete-bucket",
            Command::Put { .. } => "put",
            Command::Get { .. } => "get",
            Command::Url { .. } => "url",
            Command::List { .. } => "list",
            Command::Rm { .. } => "rm",
            Command::RmPrefix { .. } => "rm-prefix",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let span = span!(Level::INFO, "command", context = cli.command.name(), bucket = %cli.bucket);

    match run(cli).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error_message = %err, error_group = "cli");
            eprintln!("cstorage: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let backend = parse_backend_from_uri(&cli.bucket)?;
    let bucket = parse_bucket_from_uri(&cli.bucket).to_string();
    info!(%backend, %bucket, "args");

    let mut storage = connect(backend, cli.credentials_file).await?;
    let ctx = match cli.timeout_secs {
        Some(secs) => Context::with_timeout(Duration::from_secs(secs)),
        None => Context::background(),
    };

    let res = execute(&storage, &ctx, &bucket, cli.command).await;
    storage.simple_disconnect().await;
    res
}

async fn connect(backend: StorageBackend, credentials_file: Option<PathBuf>) -> Result<Storage> {
    match backend {
        StorageBackend::S3 => {
            let config = aws_config::load_from_env().await;
            Ok(Storage::from_s3_config(&config))
        }
        StorageBackend::Gcs => {
            let mut options = GcsOptions::default();
            if let Some(path) = credentials_file {
                options = options.with_credentials_file(path);
            }
            Ok(Storage::connect_gcs(&options).await?)
        }
    }
}

async fn execute(storage: &Storage, ctx: &Context, bucket: &str, command: Command) -> Result<()> {
    match command {
        Command::CreateBucket { project, location } => {
            let input = CreateBucketInput::new(bucket)
                .project_id(project)
                .location(location);
            storage.create_bucket(ctx, &input).await?;
            println!("created {}", bucket);
        }
        Command::DeleteBucket => {
            storage.delete_bucket(ctx, bucket).await?;
            println!("deleted {}", bucket);
        }
        Command::Put {
            files,
            prefix,
            mime,
        } => {
            let mut inputs = Vec::with_capacity(files.len());
            for path in files {
                let name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .ok_or_else(|| CliError::FileName(path.clone()))?;
                let mime = mime.or_else(|| guess_mime(&path)).unwrap_or(MimeType::Text);
                let body = tokio::fs::read(&path)
                    .await
                    .map_err(|source| CliError::Read {
                        path: path.clone(),
                        source,
                    })?;
                inputs.push(PutObjectInput::new(bucket, format!("{}{}", prefix, name), mime, body));
            }

            let outputs = storage.put_objects(ctx, inputs).await;
            let mut failed = 0;
            for out in &outputs {
                match out.error() {
                    None => println!("put {}", out.key),
                    Some(err) => {
                        failed += 1;
                        println!("failed {}: {}", out.key, err);
                    }
                }
            }
            batch_result(failed, outputs.len())?;
        }
        Command::Get { key } => {
            let obj = storage.get_object_by_key(ctx, bucket, &key).await?;
            match obj.text() {
                Ok(text) => println!("{}", text),
                Err(_) => println!(
                    "{} ({} bytes, {})",
                    obj.key,
                    obj.size,
                    obj.mime_type.as_deref().unwrap_or("-")
                ),
            }
        }
        Command::Url { key } => {
            println!("{}", storage.get_object_url(bucket, &key)?);
        }
        Command::List { prefix, delimiter } => {
            let mut options = ListOptions::new();
            if let Some(prefix) = prefix {
                options = options.prefix(prefix);
            }
            if let Some(delimiter) = delimiter {
                options = options.delimiter(delimiter);
            }

            for obj in storage.list_objects(ctx, bucket, &[options]).await? {
                let modified = obj
                    .last_modified
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", obj.size, modified, obj.key);
            }
        }
        Command::Rm { keys } => {
            let inputs = keys.into_iter().map(|key| DeleteObjectInput::new(bucket, key));
            let outputs = storage.delete_objects(ctx, inputs).await;
            let mut failed = 0;
            for out in &outputs {
                match out.error() {
                    None => println!("deleted {}", out.key),
                    Some(err) => {
                        failed += 1;
                        println!("failed {}: {}", out.key, err);
                    }
                }
            }
            batch_result(failed, outputs.len())?;
        }
        Command::RmPrefix { prefixes } => {
            let inputs = prefixes
                .into_iter()
                .map(|prefix| DeletePrefixInput::new(bucket, prefix));
            let outputs = storage.delete_objects_by_prefixes(ctx, inputs).await;
            let mut failed = 0;
            for out in &outputs {
                match out.error() {
                    None => println!("deleted {}*", out.prefix),
                    Some(err) => {
                        failed += 1;
                        println!("failed {}*: {}", out.prefix, err);
                    }
                }
            }
            batch_result(failed, outputs.len())?;
        }
    }
    Ok(())
}

fn guess_mime(path: &Path) -> Option<MimeType> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(MimeType::from_extension)
}

fn batch_result(failed: usize, total: usize) -> Result<()> {
    if failed == 0 {
        return Ok(());
    }
    Err(CliError::Batch { failed, total })
}
