use std::fmt;

use chrono::{DateTime, Utc};
use storage::repository::Storage;
use study_core::model::{
    BibleCharacter, Category, CategoryId, CharacterId, CharacterProfile, ContentId, ContentKind,
    ContentNode, DifficultyLevel, ParentRef, Role, Testament, Topic, TopicDetails, TopicId, UserId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user: Option<UserId>,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUser { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUser { raw } => {
                write!(f, "invalid --user value (expected UUID): {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidUser { raw })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("STUDY_DB_URL").unwrap_or_else(|_| "sqlite:study.sqlite3".into());
        let mut user = std::env::var("STUDY_SEED_USER")
            .ok()
            .map(parse_user)
            .transpose()?;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    user = Some(parse_user(require_value(&mut args, "--user")?)?);
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, user, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:study.sqlite3)");
    eprintln!("  --user <uuid>             User to grant the admin role");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  STUDY_DB_URL, STUDY_SEED_USER");
}

const OLD_TESTAMENT: u128 = 0x0100;
const GENESIS: u128 = 0x0200;
const EXODUS: u128 = 0x0201;
const CREATION: u128 = 0x0300;

fn lesson(
    id: u128,
    parent: ParentRef,
    title: &str,
    order: i32,
    references: &[&str],
) -> Result<ContentNode, Box<dyn std::error::Error>> {
    let node = ContentNode::new(
        ContentId::from_u128(id),
        TopicId::from_u128(OLD_TESTAMENT),
        ContentKind::Lesson,
        parent,
        title,
        None,
        order,
        true,
    )?;
    Ok(node.with_body(
        Some(format!("Read {} and take notes.", references.join(", "))),
        references.iter().map(|r| (*r).to_owned()).collect(),
    ))
}

async fn seed_tree(storage: &Storage, now: DateTime<Utc>) -> Result<usize, Box<dyn std::error::Error>> {
    let topic = Topic::new(
        TopicId::from_u128(OLD_TESTAMENT),
        "Old Testament",
        Some("From creation to the exodus".into()),
        1,
        true,
        TopicDetails {
            difficulty: Some(DifficultyLevel::Beginner),
            duration_weeks: Some(8),
            ..TopicDetails::default()
        },
        now,
    )?;
    storage.topics.upsert_topic(&topic).await?;

    for (id, title, order) in [(GENESIS, "Genesis", 1), (EXODUS, "Exodus", 2)] {
        let category = Category::new(
            CategoryId::from_u128(id),
            topic.id(),
            title,
            None,
            None,
            order,
            true,
        )?;
        storage.categories.upsert_category(&category).await?;
    }

    let creation = ContentNode::new(
        ContentId::from_u128(CREATION),
        topic.id(),
        ContentKind::Subcategory,
        ParentRef::Category(CategoryId::from_u128(GENESIS)),
        "Creation",
        None,
        1,
        true,
    )?;
    let nodes = vec![
        creation,
        lesson(0x0400, ParentRef::Content(ContentId::from_u128(CREATION)), "Six days", 1, &["Genesis 1"])?,
        lesson(0x0401, ParentRef::Content(ContentId::from_u128(CREATION)), "The garden", 2, &["Genesis 2"])?,
        lesson(0x0402, ParentRef::Category(CategoryId::from_u128(GENESIS)), "The flood", 2, &["Genesis 6", "Genesis 7"])?,
        lesson(0x0403, ParentRef::Category(CategoryId::from_u128(EXODUS)), "The burning bush", 1, &["Exodus 3"])?,
    ];
    for node in &nodes {
        storage.contents.upsert_content(node).await?;
    }
    Ok(nodes.len())
}

async fn seed_characters(storage: &Storage, now: DateTime<Utc>) -> Result<usize, Box<dyn std::error::Error>> {
    let people = [
        (0x0500, "Abraham", Testament::Old, "Patriarch", "Genesis 12:1-3"),
        (0x0501, "Moses", Testament::Old, "Prophet", "Exodus 3:14"),
        (0x0502, "Ruth", Testament::Old, "Matriarch", "Ruth 1:16"),
        (0x0503, "Peter", Testament::New, "Apostle", "Matthew 16:18"),
        (0x0504, "Mary Magdalene", Testament::New, "Disciple", "John 20:18"),
    ];
    for (id, name, testament, category, verse) in people {
        let character = BibleCharacter::new(
            CharacterId::from_u128(id),
            name,
            testament,
            CharacterProfile {
                category: Some(category.into()),
                key_verses: vec![verse.into()],
                ..CharacterProfile::default()
            },
            now,
        )?;
        storage.characters.upsert_character(&character).await?;
    }
    Ok(people.len())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let nodes = seed_tree(&storage, now).await?;
    let characters = seed_characters(&storage, now).await?;
    if let Some(user) = args.user {
        storage.roles.grant_role(user, Role::Admin).await?;
        tracing::info!(%user, "granted admin role");
    }

    tracing::info!(
        nodes,
        characters,
        db_url = %args.db_url,
        "seeded study content"
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "seeding failed");
        std::process::exit(2);
    }
}
