use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{Category, Transaction, create_transaction, initialize_db};

/// A utility for creating a test database for the Expense Tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of expenses to generate, counting back from today.
    #[arg(long, short, default_value_t = 45)]
    days: u16,
}

const SAMPLE_EXPENSES: [(&str, Category, &str); 8] = [
    ("4.50", Category::Food, "Coffee"),
    ("18.20", Category::Food, "Lunch with the team"),
    ("62.00", Category::Fuel, "Filled up the car"),
    ("120.00", Category::Bills, "Electricity"),
    ("35.99", Category::Shopping, "New headphones"),
    ("9.00", Category::Other, ""),
    ("73.45", Category::Food, "Groceries"),
    ("15.00", Category::Other, "Parking"),
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

    println!("Creating expenses for the last {} days...", args.days);

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for day in 0..args.days {
        let date = today - Duration::days(i64::from(day));

        // Skip every third day so the calendar has some gaps.
        if day % 3 == 2 {
            continue;
        }

        let expenses_today = 1 + usize::from(day) % 3;

        for offset in 0..expenses_today {
            let (amount, category, note) =
                SAMPLE_EXPENSES[(usize::from(day) + offset) % SAMPLE_EXPENSES.len()];

            create_transaction(
                Transaction::build(amount.parse()?, date)
                    .category(category)
                    .note(note),
                &conn,
            )?;
            count += 1;
        }
    }

    println!("Created {count} expenses.");
    println!("Success!");

    Ok(())
}
