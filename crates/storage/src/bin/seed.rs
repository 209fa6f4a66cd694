use std::fmt;

use chrono::{DateTime, Utc};
use course_core::model::{
    AnswerOption, Chapter, ChapterId, QuestionId, QuizQuestion, Video, VideoId,
};
use storage::repository::Storage;
use storage::sqlite::ensure_database_file;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:learning_app.db".into());
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

        Ok(Self { db_url, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:learning_app.db)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  DATABASE_URL");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    ensure_database_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    // Ids are fixed so re-running the seed refreshes the same rows and user
    // progress keeps pointing at the right chapters.
    let chapters: [(u64, &str, &str); 5] = [
        (
            1,
            "Introduction to Programming",
            "Learn the basics of programming and computer science fundamentals",
        ),
        (
            2,
            "Variables and Data Types",
            "Understanding variables, data types, and how to work with them",
        ),
        (
            3,
            "Control Flow",
            "Master if statements, loops, and conditional logic",
        ),
        (
            4,
            "Functions and Methods",
            "Learn how to write reusable code with functions",
        ),
        (
            5,
            "Object-Oriented Programming",
            "Introduction to OOP concepts and principles",
        ),
    ];

    for (index, (id, title, description)) in chapters.iter().enumerate() {
        let order_index = u32::try_from(index)? + 1;
        let chapter = Chapter::new(ChapterId::new(*id), *title, *description, order_index, now)?;
        storage.catalog.upsert_chapter(&chapter).await?;
    }

    let videos: [(u64, u64, &str, &str, u32); 5] = [
        (
            1,
            1,
            "Programming for Beginners - Learn to Code",
            "https://www.youtube.com/watch?v=zOjov-2OZ0E",
            3720,
        ),
        (
            2,
            2,
            "Variables and Data Types Explained",
            "https://www.youtube.com/watch?v=OH86oLzVzzc",
            780,
        ),
        (
            3,
            3,
            "Control Flow - If Statements and Loops",
            "https://www.youtube.com/watch?v=PYTyhXKSMzE",
            900,
        ),
        (
            4,
            4,
            "Functions in Programming - Complete Guide",
            "https://www.youtube.com/watch?v=nX34jsB_v3E",
            1020,
        ),
        (
            5,
            5,
            "Object Oriented Programming (OOP) Explained",
            "https://www.youtube.com/watch?v=pTB0EiLXUC8",
            1380,
        ),
    ];

    for (id, chapter_id, title, url, duration) in videos {
        let video = Video::new(
            VideoId::new(id),
            ChapterId::new(chapter_id),
            title,
            url,
            duration,
            now,
        )?;
        storage.catalog.upsert_video(&video).await?;
    }

    type QuestionRow = (
        u64,
        u64,
        &'static str,
        [&'static str; 4],
        AnswerOption,
        u32,
    );
    let questions: [QuestionRow; 10] = [
        (
            1,
            1,
            "What is a program?",
            [
                "A set of instructions for a computer",
                "A type of computer hardware",
                "A programming language",
                "A database",
            ],
            AnswerOption::A,
            1,
        ),
        (
            2,
            1,
            "Which of these is a programming language?",
            ["HTML", "Python", "CSS", "JSON"],
            AnswerOption::B,
            2,
        ),
        (
            3,
            2,
            "What is a variable?",
            [
                "A fixed value",
                "A container for storing data",
                "A type of loop",
                "A function",
            ],
            AnswerOption::B,
            1,
        ),
        (
            4,
            2,
            "Which data type stores whole numbers?",
            ["String", "Float", "Integer", "Boolean"],
            AnswerOption::C,
            2,
        ),
        (
            5,
            3,
            "What does an if statement do?",
            [
                "Stores data",
                "Makes decisions based on conditions",
                "Creates loops",
                "Defines functions",
            ],
            AnswerOption::B,
            1,
        ),
        (
            6,
            3,
            "Which loop runs at least once?",
            ["for loop", "while loop", "do-while loop", "if loop"],
            AnswerOption::C,
            2,
        ),
        (
            7,
            4,
            "What is a function?",
            [
                "A variable",
                "A reusable block of code",
                "A data type",
                "A loop",
            ],
            AnswerOption::B,
            1,
        ),
        (
            8,
            4,
            "What keyword is used to return a value?",
            ["give", "return", "send", "output"],
            AnswerOption::B,
            2,
        ),
        (
            9,
            5,
            "What does OOP stand for?",
            [
                "Online Operating Program",
                "Object-Oriented Programming",
                "Ordered Operation Process",
                "Optimized Output Protocol",
            ],
            AnswerOption::B,
            1,
        ),
        (
            10,
            5,
            "What is encapsulation?",
            [
                "Combining data and methods",
                "A type of loop",
                "A variable type",
                "A function call",
            ],
            AnswerOption::A,
            2,
        ),
    ];

    for (id, chapter_id, text, [a, b, c, d], correct, order_index) in questions {
        let question = QuizQuestion::new(
            QuestionId::new(id),
            ChapterId::new(chapter_id),
            text,
            a,
            b,
            c,
            d,
            correct,
            order_index,
            now,
        )?;
        storage.catalog.upsert_question(&question).await?;
    }

    println!(
        "Seeded {} chapters, {} videos, and {} quiz questions into {}",
        chapters.len(),
        videos.len(),
        questions.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
