use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use cachin::{
    Session, Transaction, TransactionKind, Username, create_transaction, create_user,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of Cachín.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The username of the test user.
    #[arg(long, short, default_value = "test_user")]
    username: String,
}

/// Sample transactions as (days ago, amount, kind, name, emoji).
const SAMPLE_TRANSACTIONS: [(i64, f64, TransactionKind, &str, &str); 6] = [
    (30, 2500.0, TransactionKind::Income, "Salary", "💼"),
    (28, 900.0, TransactionKind::Expense, "Rent", "🏠"),
    (21, 120.5, TransactionKind::Expense, "Groceries", "🛒"),
    (14, 45.0, TransactionKind::Expense, "Cinema", "🎬"),
    (7, 300.0, TransactionKind::Income, "Freelance", "💻"),
    (1, 18.75, TransactionKind::Expense, "Coffee", "☕"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {}...", args.username);
    let session = Session::from(create_user(Username::new(&args.username)?, &conn)?);

    println!("Creating sample transactions...");
    let now = OffsetDateTime::now_utc();

    for (days_ago, amount, kind, name, emoji) in SAMPLE_TRANSACTIONS {
        create_transaction(
            Transaction::build(&session, amount, kind, name, now - Duration::days(days_ago))
                .icon(Some(emoji.to_owned())),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
