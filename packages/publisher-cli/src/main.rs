use clap::Parser;
use publisher_config::{Settings, DEFAULT_API_URL, DEFAULT_CHECKSUM_FILE, DEFAULT_UPLOAD_URL};
use publisher_core::{PublishReport, Publisher};
use publisher_provider::GitHubReleaseService;
use publisher_utils::CallContext;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "release-publisher")]
#[command(version, about = "Create or update a GitHub release and attach build artifacts")]
struct Cli {
    /// API token used to talk to GitHub
    #[arg(long, env = "PLUGIN_API_KEY", hide_env_values = true)]
    api_key: String,

    /// API root, override for GitHub Enterprise
    #[arg(long, env = "PLUGIN_BASE_URL", default_value = DEFAULT_API_URL)]
    base_url: String,

    /// Upload root, override for GitHub Enterprise
    #[arg(long, env = "PLUGIN_UPLOAD_URL", default_value = DEFAULT_UPLOAD_URL)]
    upload_url: String,

    #[arg(long, env = "DRONE_REPO_OWNER")]
    owner: String,

    #[arg(long, env = "DRONE_REPO_NAME")]
    repo: String,

    #[arg(long, env = "DRONE_TAG")]
    tag: String,

    /// Build event; only `tag` events may publish
    #[arg(long, env = "DRONE_BUILD_EVENT")]
    event: Option<String>,

    /// Files to upload, glob patterns allowed
    #[arg(long, env = "PLUGIN_FILES", value_delimiter = ',')]
    files: Vec<String>,

    /// What to do when an asset with the same name exists: overwrite, fail or skip
    #[arg(long, env = "PLUGIN_FILE_EXISTS", default_value = "overwrite")]
    file_exists: String,

    /// Checksum algorithms to generate (sha256, sha512)
    #[arg(long, env = "PLUGIN_CHECKSUM", value_delimiter = ',')]
    checksum: Vec<String>,

    /// Checksum file name, CHECKSUM is replaced by the algorithm
    #[arg(long, env = "PLUGIN_CHECKSUM_FILE", default_value = DEFAULT_CHECKSUM_FILE)]
    checksum_file: String,

    /// List base names instead of paths in checksum files
    #[arg(long, env = "PLUGIN_CHECKSUM_FLATTEN")]
    checksum_flatten: bool,

    #[arg(long, env = "PLUGIN_CHECKSUM_DIR", default_value = ".")]
    checksum_dir: PathBuf,

    #[arg(long, env = "PLUGIN_DRAFT")]
    draft: bool,

    #[arg(long, env = "PLUGIN_PRERELEASE")]
    prerelease: bool,

    /// Release title, or a file holding it
    #[arg(long, env = "PLUGIN_TITLE", default_value = "")]
    title: String,

    /// Release notes, or a file holding them
    #[arg(long, env = "PLUGIN_NOTE", default_value = "")]
    note: String,

    /// Update title, notes and draft state of an existing release
    #[arg(long, env = "PLUGIN_OVERWRITE")]
    overwrite: bool,

    /// Prefer an existing draft for the tag
    #[arg(long, env = "PLUGIN_PICKUP_DRAFT")]
    pickup_draft: bool,

    /// Give up after this many seconds
    #[arg(long, env = "PLUGIN_TIMEOUT")]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PLUGIN_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            upload_url: self.upload_url.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            tag: self.tag.clone(),
            event: self.event.clone(),
            files: self.files.clone(),
            file_exists: self.file_exists.clone(),
            checksum: self.checksum.clone(),
            checksum_file: self.checksum_file.clone(),
            checksum_flatten: self.checksum_flatten,
            checksum_dir: self.checksum_dir.clone(),
            draft: self.draft,
            prerelease: self.prerelease,
            title: self.title.clone(),
            note: self.note.clone(),
            overwrite: self.overwrite,
            pickup_draft: self.pickup_draft,
        }
    }

    fn context(&self) -> CallContext {
        match self.timeout {
            Some(secs) => CallContext::new().with_timeout(Duration::from_secs(secs)),
            None => CallContext::new(),
        }
    }
}

async fn run(cli: &Cli) -> Result<PublishReport, Box<dyn std::error::Error>> {
    let settings = cli.settings();
    let connection = settings.connection()?;
    let spec = settings.validate()?;

    let service = GitHubReleaseService::new(connection.api_key)
        .with_api_url(&connection.base_url)
        .with_upload_url(&connection.upload_url);

    let ctx = cli.context();
    let cancel_token = ctx.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight request");
            cancel_token.cancel();
        }
    });

    let publisher = Publisher::new(Arc::new(service), ctx);
    Ok(publisher.publish(&spec).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&cli).await {
        Ok(report) => {
            info!(
                "Published {} (release {}, {:?})",
                report.tag, report.release_id, report.action
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
