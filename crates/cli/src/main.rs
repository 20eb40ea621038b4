//! `assethub` -- command line front end for the asset catalog.
//!
//! `list` is the public read-only view and needs no login, and `signup`
//! creates the account it then uses. Every other command logs in first
//! when credentials are configured.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default                     |
//! |---------------------------------|----------|-----------------------------|
//! | `ASSETHUB_API_URL`              | no       | `http://localhost:5000/api` |
//! | `ASSETHUB_PRESIGN_PATH`         | no       | `/uploads/presign`          |
//! | `ASSETHUB_REQUEST_TIMEOUT_SECS` | no       | `30`                        |
//! | `ASSETHUB_EMAIL`                | no       | --                          |
//! | `ASSETHUB_PASSWORD`             | no       | --                          |
//! | `ASSETHUB_LOG_FORMAT`           | no       | `text` (or `json`)          |

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use assethub_catalog::store::CatalogStore;
use assethub_catalog::workflow::UploadWorkflow;
use assethub_client::api::ApiClient;
use assethub_client::config::ClientConfig;
use assethub_client::storage::StorageClient;
use assethub_core::form::AssetForm;
use assethub_core::tag::TagName;
use assethub_core::types::DbId;
use assethub_core::upload::{Attachment, PendingUpload};
use assethub_core::user::SignupRequest;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Debug, Parser)]
#[command(name = "assethub", version, about = "Browse and manage the asset catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all assets (public, no login needed)
    List,
    /// List all tags
    Tags,
    /// Create, rename, or delete tags
    #[command(subcommand)]
    Tag(TagCommand),
    /// Create an asset, optionally uploading a file for it
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Tag id to attach; repeat for several
        #[arg(long = "tag")]
        tags: Vec<DbId>,
        /// File to upload and link from the asset
        #[arg(long)]
        file: Option<PathBuf>,
        /// Override the detected content type of --file
        #[arg(long, requires = "file")]
        content_type: Option<String>,
    },
    /// Delete an asset
    Delete { id: DbId },
    /// Show the logged-in user
    Whoami,
    /// Create an account
    Signup {
        username: String,
        email: String,
        /// Defaults to ASSETHUB_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },
    /// End the server-side session
    Logout,
    /// Print a short-lived download URL for a stored object key
    Url { key: String },
}

#[derive(Debug, Subcommand)]
enum TagCommand {
    Add { name: String },
    Rename { id: DbId, name: String },
    Delete { id: DbId },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "assethub=info,assethub_catalog=info,assethub_client=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("ASSETHUB_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(api_url = %config.api_url, "Loaded configuration");

    let api = ApiClient::new(&config)?;
    let store = Arc::new(CatalogStore::new(api));

    match cli.command {
        Command::List => {
            let assets = store.refresh_assets().await?;
            print!("{}", output::asset_table(&assets));
        }
        Command::Tags => {
            login(&store, &config).await?;
            let snapshot = store.refresh().await?;
            print!("{}", output::tag_table(snapshot.tags.tags()));
        }
        Command::Tag(cmd) => {
            login(&store, &config).await?;
            run_tag_command(&store, cmd).await?;
        }
        Command::Create {
            name,
            description,
            tags,
            file,
            content_type,
        } => {
            login(&store, &config).await?;
            // Tag ids resolve against the registry, so load it first.
            store.refresh().await?;

            let form = AssetForm::new(name)
                .with_description(description)
                .with_tags(tags);
            let attachment = match file {
                Some(path) => read_upload(&path, content_type).await?.into(),
                None => Attachment::NoUpload,
            };

            let storage =
                StorageClient::new(Duration::from_secs(config.request_timeout_secs))?;
            let workflow = UploadWorkflow::new(Arc::clone(&store), storage);
            let asset = workflow.submit(&form, attachment).await?;
            print!("{}", output::asset_table(std::slice::from_ref(&asset)));
        }
        Command::Delete { id } => {
            login(&store, &config).await?;
            store.delete_asset(id).await?;
            println!("Deleted asset {id}");
        }
        Command::Whoami => {
            login(&store, &config).await?;
            match store.api().current_user().await? {
                Some(user) => println!("{}", output::user_line(&user)),
                None => println!("Not logged in"),
            }
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            let password = password
                .or_else(|| std::env::var("ASSETHUB_PASSWORD").ok())
                .ok_or_else(|| anyhow::anyhow!("--password or ASSETHUB_PASSWORD is required"))?;
            let request = SignupRequest {
                username,
                email,
                password,
            };
            let user = store.api().signup(&request).await?;
            println!("Signed up as {}", output::user_line(&user));
        }
        Command::Logout => {
            login(&store, &config).await?;
            store.api().logout().await?;
            println!("Logged out");
        }
        Command::Url { key } => {
            login(&store, &config).await?;
            println!("{}", store.api().presign_download(&key).await?);
        }
    }
    Ok(())
}

async fn run_tag_command(store: &CatalogStore<ApiClient>, cmd: TagCommand) -> anyhow::Result<()> {
    match cmd {
        TagCommand::Add { name } => {
            let tag = store.create_tag(&TagName::parse(&name)?).await?;
            println!("Tag {} '{}'", tag.id, tag.name);
        }
        TagCommand::Rename { id, name } => {
            let tag = store.rename_tag(id, &TagName::parse(&name)?).await?;
            println!("Tag {} renamed to '{}'", tag.id, tag.name);
        }
        TagCommand::Delete { id } => {
            store.delete_tag(id).await?;
            println!("Deleted tag {id}");
        }
    }
    Ok(())
}

/// Log in with the configured credentials, if any.
async fn login(store: &CatalogStore<ApiClient>, config: &ClientConfig) -> anyhow::Result<()> {
    match &config.login {
        Some(credentials) => {
            store.api().login(credentials).await?;
        }
        None => tracing::debug!("No credentials configured, continuing anonymously"),
    }
    Ok(())
}

async fn read_upload(path: &Path, content_type: Option<String>) -> anyhow::Result<PendingUpload> {
    let payload = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("{} is not a file", path.display()))?;

    let upload = PendingUpload::new(filename, payload);
    Ok(match content_type {
        Some(ct) => upload.with_content_type(ct),
        None => upload,
    })
}
