use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use updoot_client::{metrics, ApiClient, Config, RemoteEngagement};
use updoot_core::dates::{days_left, Countdown};
use updoot_core::funding::progress_label;
use updoot_core::validation::{account_password_error, password_strength};
use updoot_core::{
    resolve, EngagementKind, EngagementTarget, Language, PcKind, Role, SyncOutcome,
};

#[derive(Parser)]
#[command(name = "updootctl")]
#[command(about = "Updoot client core tool", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "UPDOOT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Lang::En, global = true)]
    lang: Lang,

    /// Print client metrics before exiting
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Lang {
    En,
    Ko,
}

impl From<Lang> for Language {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::En => Language::En,
            Lang::Ko => Language::Ko,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show where a role ends up when opening a route
    Access {
        path: String,
        #[arg(short, long)]
        role: Role,
    },
    /// Like or unlike an item; the item kind follows the page route
    Like {
        #[arg(short, long)]
        username: String,
        item: String,
        #[arg(long, default_value = "/proposals")]
        route: String,
    },
    /// Bookmark or unbookmark an item
    Bookmark {
        #[arg(short, long)]
        email: String,
        item: String,
        #[arg(short, long, default_value_t = PcKind::Proposal)]
        kind: PcKind,
    },
    /// Show the like and bookmark snapshots of a user
    Snapshot {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
    },
    /// Check a password against the sign-up and sign-in rules
    Password { password: String },
    /// Time left until an end date given in epoch milliseconds
    Countdown { end_ms: i64 },
    /// Funding progress of a campaign
    Progress { current: f64, target: f64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let lang = Language::from(cli.lang);

    match &cli.command {
        Commands::Access { path, role } => match resolve(path, *role) {
            Some(target) => println!("redirect -> {}", target),
            None => println!("render (dashboard: {})", role.dashboard()),
        },
        Commands::Like { username, item, route } => {
            let target = EngagementTarget::new(username.clone(), item.clone(), PcKind::from_route(route));
            toggle(&config, EngagementKind::Like, target).await?;
        }
        Commands::Bookmark { email, item, kind } => {
            let target = EngagementTarget::new(email.clone(), item.clone(), *kind);
            toggle(&config, EngagementKind::Bookmark, target).await?;
        }
        Commands::Snapshot { username, email } => {
            let api = ApiClient::new(&config.backend)?;
            let (likes, bookmark) = tokio::try_join!(api.likes(username), api.bookmarks(email))?;
            let liked: Vec<&str> = likes.iter().map(|l| l.type_id.as_str()).collect();
            let snapshot = serde_json::json!({
                "likes": liked,
                "proposalBookmarks": bookmark.as_ref().map(|b| b.proposal_bookmarks.clone()).unwrap_or_default(),
                "campaignBookmarks": bookmark.as_ref().map(|b| b.campaign_bookmarks.clone()).unwrap_or_default(),
            });
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Password { password } => {
            for (requirement, met) in password_strength(password) {
                println!("[{}] {}", if met { "x" } else { " " }, requirement.label(lang));
            }
            match account_password_error(password, lang) {
                Some(message) => println!("sign-in: {}", message),
                None => println!("sign-in: ok"),
            }
        }
        Commands::Countdown { end_ms } => {
            let countdown = Countdown::until(*end_ms);
            println!("{}", countdown.long(lang));
            println!("{} ({} days left)", countdown.short(lang), days_left(chrono::Utc::now(), *end_ms));
        }
        Commands::Progress { current, target } => {
            println!("{}%", progress_label(*current, *target));
        }
    }

    if cli.metrics {
        print!("{}", metrics::render());
    }
    Ok(())
}

/// Flips one membership the way a page control does and waits for it to settle.
async fn toggle(config: &Config, kind: EngagementKind, target: EngagementTarget) -> anyhow::Result<()> {
    let remote = RemoteEngagement::new(ApiClient::new(&config.backend)?);
    let is_member = match kind {
        EngagementKind::Like => remote.is_liked(&target.subject, &target.item_id).await?,
        EngagementKind::Bookmark => {
            remote
                .is_bookmarked(&target.subject, target.item_kind, &target.item_id)
                .await?
        }
    };

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let action = remote.action_with(kind, &config.engagement, move |report| {
        // the receiver is gone once the wait below has timed out
        tx.send(report.clone()).ok();
    });
    let before = action.initialize(is_member);
    let item = target.item_id.clone();
    action.toggle(target);
    info!(%kind, %item, ?before, "toggled");

    match tokio::time::timeout(config.backend.timeout(), rx.recv()).await {
        Ok(Some(report)) => match report.outcome {
            SyncOutcome::Confirmed => println!("backend confirmed {} {}", kind, item),
            SyncOutcome::Failed(reason) => println!("backend rejected {} {}: {}", kind, item, reason),
        },
        _ => println!("no backend response for {} {}", kind, item),
    }

    tokio::time::sleep(config.engagement.settle_delay()).await;
    println!("{} {}: {:?} -> {:?}", kind, item, before, action.state());
    Ok(())
}
