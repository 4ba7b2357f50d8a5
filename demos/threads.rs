//! This example shows:
//! - Creating a chanfetch client with a custom configuration
//! - Walking the first index page of a board
//! - Fetching the posts of the first stickied thread
//! - Printing who replied to the opening post

use chanfetch::{Client, Config};
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Type alias for simplifying error handling
type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    // Only look at the first page and skip threads that fail to parse
    let config = Config {
        max_pages: 1,
        raise_parsing_exceptions: false,
        ..Config::default()
    };
    let client = Client::with_config(config)?;

    let threads = client.threads("/po/").collect_all().await?;
    let Some(sticky) = threads.iter().find(|thread| thread.is_stickied()) else {
        println!("No stickied thread on the first page.");
        return Ok(());
    };

    let posts = client.posts(sticky).await?;
    match posts.first() {
        Some(op) => {
            println!("{}: {}", op.thread(), op.thread().title().unwrap_or("(no subject)"));
            println!("{} repl(y/ies) to the opening post: {:?}", op.replies().len(), op.replies());
        }
        None => println!("{sticky} has no posts."),
    }

    Ok(())
}
