//! Terminal front end for the Instaclone feed.
//!
//! # Responsibility
//! - Parse commands and wire core services to a SQLite data file.
//! - Render feed cards and notices as plain text.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use instaclone_core::db::open_db;
use instaclone_core::{
    core_version, default_log_level, init_logging, AttachmentKind, AuthService, ComposeService,
    FeedService, Notice, PostCard, PostRepository, SqliteStore, SqliteTablePostRepository,
    TablePostRepository, UserProfile,
};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DB_FILE_NAME: &str = "instaclone.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Parser, Debug)]
#[command(name = "instaclone", version, about = "Instaclone demo feed")]
struct Cli {
    /// Directory holding the data file and logs.
    #[arg(
        long,
        global = true,
        env = "INSTACLONE_DATA_DIR",
        default_value = ".instaclone",
        value_name = "PATH"
    )]
    data_dir: PathBuf,

    /// trace|debug|info|warn|error (default depends on build mode).
    #[arg(long, global = true, env = "INSTACLONE_LOG", value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with any username and a 6+ character password.
    Login { username: String, password: String },
    /// End the current session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Render the feed.
    Feed {
        /// Expand comments under every post.
        #[arg(long)]
        comments: bool,
    },
    /// Toggle the like on a post.
    Like { post_id: String },
    /// Comment on a post as the logged-in user.
    Comment { post_id: String, text: String },
    /// Compose and publish a post (not persisted).
    Compose(ComposeArgs),
    /// Work with the hosted posts table.
    #[command(subcommand)]
    Table(TableCommand),
    /// Print the core version.
    Version,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Whoami => "whoami",
            Self::Feed { .. } => "feed",
            Self::Like { .. } => "like",
            Self::Comment { .. } => "comment",
            Self::Compose(_) => "compose",
            Self::Table(_) => "table",
            Self::Version => "version",
        }
    }
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[arg(long, default_value = "")]
    text: String,
    /// Number of photos/videos to attach.
    #[arg(long, default_value_t = 0)]
    media: usize,
    /// Number of documents to attach.
    #[arg(long, default_value_t = 0)]
    document: usize,
    #[arg(long, value_name = "URL")]
    link: Vec<String>,
    #[arg(long)]
    private: bool,
    #[arg(long)]
    no_comments: bool,
    #[arg(long)]
    no_notify: bool,
}

#[derive(Subcommand, Debug)]
enum TableCommand {
    /// List rows, newest first.
    List,
    /// Insert a row authored by the logged-in user.
    Create { content: String },
    /// Delete a row you authored.
    Delete { id: Uuid },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = absolute(&cli.data_dir)?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory `{}`", data_dir.display()))?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = data_dir.join(LOG_DIR_NAME);
    init_logging(&level, &log_dir.to_string_lossy()).map_err(|err| anyhow!(err))?;

    let conn = open_db(data_dir.join(DB_FILE_NAME)).context("opening data file")?;
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );
    run(&conn, cli.command)
}

fn run(conn: &Connection, command: Command) -> anyhow::Result<()> {
    let store = SqliteStore::try_new(conn).context("preparing key-value store")?;
    let mut auth = AuthService::new(&store);

    match command {
        Command::Login { username, password } => match auth.login(&username, &password) {
            Ok(notice) => print_notice(&notice),
            Err(err) => {
                print_notice(&err.notice());
                return Err(err.into());
            }
        },
        Command::Logout => print_notice(&auth.logout()),
        Command::Whoami => match auth.current_user() {
            Some(user) => println!("{} ({})", user.username, user.avatar),
            None => println!("not logged in"),
        },
        Command::Feed { comments } => {
            let mut feed = FeedService::new(PostRepository::new(&store), viewer(&auth));
            feed.mount().map_err(|err| feed_failure(&err))?;
            if comments {
                let ids: Vec<_> = feed.posts().iter().map(|post| post.id.clone()).collect();
                for id in &ids {
                    feed.toggle_comments(id);
                }
            }
            for card in feed.cards() {
                print_card(&card);
            }
        }
        Command::Like { post_id } => {
            let mut feed = FeedService::new(PostRepository::new(&store), viewer(&auth));
            feed.mount().map_err(|err| feed_failure(&err))?;
            let notice = feed.like(&post_id).map_err(|err| feed_failure(&err))?;
            print_notice(&notice);
        }
        Command::Comment { post_id, text } => {
            let mut feed = FeedService::new(PostRepository::new(&store), viewer(&auth));
            feed.mount().map_err(|err| feed_failure(&err))?;
            feed.set_comment_input(&post_id, text);
            let notice = feed
                .submit_comment(&post_id)
                .map_err(|err| feed_failure(&err))?;
            print_notice(&notice);
        }
        Command::Compose(args) => compose(args)?,
        Command::Table(table) => run_table(conn, auth.current_user(), table)?,
        Command::Version => println!("instaclone_core version={}", core_version()),
    }

    Ok(())
}

fn compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut composer = ComposeService::new();
    composer.set_text(args.text)?;
    for (kind, count) in [
        (AttachmentKind::Media, args.media),
        (AttachmentKind::Document, args.document),
    ] {
        if let Some(notice) = composer.attach_files(kind, count)? {
            print_notice(&notice);
        }
    }
    for link in &args.link {
        composer.add_link(link)?;
    }

    if let Err(err) = composer.submit() {
        print_notice(&err.notice());
        return Err(err.into());
    }
    composer.set_public(!args.private)?;
    composer.set_allow_comments(!args.no_comments)?;
    composer.set_notify_followers(!args.no_notify)?;

    let (published, notice) = composer.save()?;
    print_notice(&notice);
    println!(
        "{} visibility={} comments={} notify={} attachments={}",
        published.id,
        if published.settings.is_public { "public" } else { "private" },
        published.settings.allow_comments,
        published.settings.notify_followers,
        published.draft.attachments.len()
    );
    Ok(())
}

fn run_table(
    conn: &Connection,
    user: Option<&UserProfile>,
    command: TableCommand,
) -> anyhow::Result<()> {
    let repo = SqliteTablePostRepository::try_new(conn)?;
    match command {
        TableCommand::List => {
            for post in repo.list_posts()? {
                let marker = match user {
                    Some(user) if post.is_authored_by(&user.id) => " (yours)",
                    _ => "",
                };
                println!(
                    "[{}] {}{} at {}\n    {}\n    id={}",
                    post.avatar_fallback(),
                    post.username.as_deref().unwrap_or("unknown"),
                    marker,
                    post.created_at,
                    post.content,
                    post.id
                );
            }
        }
        TableCommand::Create { content } => {
            let user = user.ok_or_else(|| anyhow!("log in before posting"))?;
            let post = repo.create_post(user, &content)?;
            println!("created {}", post.id);
        }
        TableCommand::Delete { id } => {
            let user = user.ok_or_else(|| anyhow!("log in before deleting"))?;
            match repo.delete_post(id, &user.id) {
                Ok(()) => print_notice(&Notice::info("Post deleted", "Post deleted successfully")),
                Err(err) => {
                    print_notice(&Notice::destructive("Delete failed", "Failed to delete post"));
                    return Err(err.into());
                }
            }
        }
    }
    Ok(())
}

fn viewer<S: instaclone_core::KeyValueStore>(auth: &AuthService<S>) -> Option<UserProfile> {
    auth.current_user().cloned()
}

fn feed_failure(err: &instaclone_core::FeedError) -> anyhow::Error {
    print_notice(&err.notice());
    anyhow!("{err}")
}

fn print_notice(notice: &Notice) {
    if notice.is_destructive() {
        eprintln!("{notice}");
    } else {
        println!("{notice}");
    }
}

fn print_card(card: &PostCard<'_>) {
    let post = card.post;
    let heart = if post.liked { "♥" } else { "♡" };
    println!("── {} [{}]", post.user.username, post.id);
    println!("   {}", post.image_url);
    println!("   {heart} {}", card.likes_label);
    println!("   {} {}", post.user.username, post.caption);
    println!("   {}", card.date_label);
    if card.comments_expanded {
        println!("   {}", card.comments_label);
        for comment in &post.comments {
            println!("     {}: {}", comment.user.username, comment.text);
        }
    }
    println!();
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("resolving current directory")?;
    Ok(cwd.join(path))
}
