mod client;
mod commands;
mod ui;

use clap::{Parser, Subcommand};
use client::ApiClient;
use commands::check_embeddings::CheckEmbeddingsCommand;
use commands::products::{AddCommand, DeleteCommand, ListCommand, ShowCommand};
use commands::search::{SearchCommand, SimilarCommand};
use commands::seed::SeedCommand;
use commands::stats::StatsCommand;
use commands::token::TokenCommand;

#[derive(Parser)]
#[command(name = "inventory")]
#[command(about = "Manage and search the inventory catalog", long_about = None)]
struct Cli {
    /// Base URL of the inventory API
    #[arg(
        long,
        global = true,
        env = "INVENTORY_API_URL",
        default_value = "http://localhost:8000"
    )]
    api_url: String,

    /// Bearer token for protected endpoints
    #[arg(long, global = true, env = "INVENTORY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    List(ListCommand),
    /// Show one product
    Show(ShowCommand),
    /// Create a product, optionally with an image
    Add(AddCommand),
    /// Delete a product and its image
    Delete(DeleteCommand),
    /// Search by text, image or both
    Search(SearchCommand),
    /// Find products similar to an existing one
    Similar(SimilarCommand),
    /// Catalog statistics
    Stats(StatsCommand),
    /// Fetch an API access token
    Token(TokenCommand),
    /// Report products missing embeddings
    CheckEmbeddings(CheckEmbeddingsCommand),
    /// Load products from a JSON file or the sample catalog
    Seed(SeedCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url, cli.token);

    match cli.command {
        Commands::List(cmd) => cmd.execute(&client).await,
        Commands::Show(cmd) => cmd.execute(&client).await,
        Commands::Add(cmd) => cmd.execute(&client).await,
        Commands::Delete(cmd) => cmd.execute(&client).await,
        Commands::Search(cmd) => cmd.execute(&client).await,
        Commands::Similar(cmd) => cmd.execute(&client).await,
        Commands::Stats(cmd) => cmd.execute(&client).await,
        Commands::Token(cmd) => cmd.execute().await,
        Commands::CheckEmbeddings(cmd) => cmd.execute(&client).await,
        Commands::Seed(cmd) => cmd.execute(&client).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_search_and_similar() {
        let cli = Cli::try_parse_from([
            "inventory",
            "--api-url",
            "http://api:9000",
            "similar",
            "4",
            "--top-k",
            "3",
            "--text-only",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "http://api:9000");
        match cli.command {
            Commands::Similar(cmd) => {
                assert_eq!(cmd.id, 4);
                assert_eq!(cmd.top_k, 3);
                assert!(cmd.text_only);
            }
            _ => panic!("expected similar"),
        }

        let cli = Cli::try_parse_from(["inventory", "search", "text", "office chair"]).unwrap();
        match cli.command {
            Commands::Search(SearchCommand {
                mode: commands::search::SearchMode::Text { query, top_k },
            }) => {
                assert_eq!(query, "office chair");
                assert_eq!(top_k, shared::dto::DEFAULT_TOP_K);
            }
            _ => panic!("expected text search"),
        }
    }
}
