use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};

use sweekt_bot::config::{self, Config};
use sweekt_bot::context::{self, Context, RepositoryContext};
use sweekt_bot::domain::Distribution;
use sweekt_bot::exec::Shell;
use sweekt_bot::forge::GithubRepository;
use sweekt_bot::git::{Git, ShellGit};
use sweekt_bot::gradle::GradleService;
use sweekt_bot::job::{self, BumpVersionFileJob, JobInput, SyncSettings, SyncUpstreamTagsJob};
use sweekt_bot::ui;

#[derive(Parser)]
#[command(
    name = "sweekt-bot",
    version,
    about = "Automation for the Sweekt Gradle fork on GitHub Actions"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short = 'C',
        long,
        global = true,
        help = "Repository checkout to work in (defaults to the current directory)"
    )]
    workdir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bump version.txt on fork branches to the latest release
    BumpVersionFile {
        #[arg(long, value_delimiter = ',', help = "Branches to bump instead of all 'changed/*'")]
        branches: Option<Vec<String>>,
    },
    /// Check out new upstream tags as 'upstream/*' branches
    SyncUpstreamTags,
    /// Point a snapshot wrapper distribution at the branch's release
    PinWrapperVersion,
    /// Print the Gradle version of a branch
    CalculateVersion {
        #[arg(long, help = "Branch to check out first")]
        branch: Option<String>,
    },
    /// Build a distribution archive with dependency verification disabled
    BuildDistribution {
        #[arg(long, value_enum, default_value_t = DistributionKind::Bin)]
        kind: DistributionKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DistributionKind {
    Bin,
    Src,
}

impl From<DistributionKind> for Distribution {
    fn from(kind: DistributionKind) -> Self {
        match kind {
            DistributionKind::Bin => Distribution::Bin,
            DistributionKind::Src => Distribution::Src,
        }
    }
}

/// Services shared by every command
struct Bot {
    config: Config,
    workdir: PathBuf,
    git: Arc<dyn Git>,
}

impl Bot {
    fn new(args: &Args) -> Result<Self> {
        let workdir = match &args.workdir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Cannot determine the working directory")?,
        };
        let config = config::load_config(args.config.as_deref(), &workdir)
            .context("Failed to load configuration")?;
        let git: Arc<dyn Git> = Arc::new(ShellGit::new(Shell::new(&workdir), &config.git.remote));
        Ok(Bot {
            config,
            workdir,
            git,
        })
    }

    fn gradle(&self) -> GradleService {
        GradleService::new(
            self.git.clone(),
            Shell::new(&self.workdir),
            self.config.files.clone(),
            self.config.retry.clean_policy(),
        )
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    ui::init_logging(context::is_debug());

    if let Err(e) = run(args).await {
        tracing::error!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let bot = Bot::new(&args)?;

    match args.command {
        Command::BumpVersionFile { branches } => {
            let context = Context::from_env()?;
            let repo = GithubRepository::new(context.repository.clone())?;
            let job = BumpVersionFileJob::new(
                bot.git.clone(),
                bot.gradle(),
                Arc::new(repo),
                context.trigger_ref,
            );
            job::execute(&job, &JobInput { branches }).await?;
        }
        Command::SyncUpstreamTags => {
            let current = RepositoryContext::from_env()?;
            let upstream = current.with_repository(bot.config.upstream.repository.as_str());
            let job = SyncUpstreamTagsJob::new(
                bot.git.clone(),
                Arc::new(GithubRepository::new(current)?),
                Arc::new(GithubRepository::new(upstream)?),
                SyncSettings::from_config(&bot.config, &bot.workdir),
            );
            job::execute(&job, &JobInput::default()).await?;
        }
        Command::PinWrapperVersion => match bot.gradle().pin_wrapper_version().await? {
            Some(version) => tracing::info!("📌 Wrapper distribution pinned to {}", version),
            None => tracing::info!("📌 Wrapper distribution is already pinned"),
        },
        Command::CalculateVersion { branch } => {
            let version = bot
                .gradle()
                .calculate_version(branch.as_deref())
                .await
                .context("Failed to calculate the Gradle version")?;
            println!("{}", version.full_sweekt_version());
        }
        Command::BuildDistribution { kind } => {
            let gradle = bot.gradle();
            gradle.clean().await?;
            let archive = gradle
                .disable_verification(gradle.build_distribution(kind.into()))
                .await?;
            println!("{}", bot.workdir.join(archive).display());
        }
    }

    Ok(())
}
