use crate::client::ApiClient;
use crate::ui;
use anyhow::Result;
use clap::{Args, Subcommand};
use shared::dto::{SearchHit, DEFAULT_TOP_K};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SearchCommand {
    #[command(subcommand)]
    pub mode: SearchMode,
}

#[derive(Subcommand, Debug)]
pub enum SearchMode {
    /// Search by a text description
    Text {
        query: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Search by an image
    Image {
        path: PathBuf,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Search by an image and a text description together
    Multimodal {
        path: PathBuf,
        query: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
}

impl SearchCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        let hits = match &self.mode {
            SearchMode::Text { query, top_k } => client.search_text(query, *top_k).await?,
            SearchMode::Image { path, top_k } => client.search_image(path, *top_k).await?,
            SearchMode::Multimodal { path, query, top_k } => {
                client.search_multimodal(path, query, *top_k).await?
            }
        };
        print_hits(&hits);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SimilarCommand {
    pub id: i32,

    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Compare text embeddings even when a multimodal one exists
    #[arg(long)]
    pub text_only: bool,
}

impl SimilarCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        let hits = client
            .search_similar(self.id, self.top_k, !self.text_only)
            .await?;
        print_hits(&hits);
        Ok(())
    }
}

fn print_hits(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("No matches.");
        return;
    }
    println!("{}", ui::hits_table(hits));
}
