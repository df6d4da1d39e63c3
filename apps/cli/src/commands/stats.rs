use crate::client::ApiClient;
use crate::ui;
use anyhow::Result;
use clap::Args;

const BAR_WIDTH: usize = 40;

#[derive(Args, Debug)]
pub struct StatsCommand {}

impl StatsCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        let stats = client.stats().await?;

        println!("{}", console::style("Catalog").bold());
        println!("{}", ui::summary_table(&stats));

        if !stats.categories.is_empty() {
            println!("\n{}", console::style("Categories").bold());
            println!("{}", ui::categories_table(&stats));
        }

        if !stats.price_histogram.is_empty() {
            println!("\n{}", console::style("Price distribution").bold());
            for line in ui::histogram_lines(&stats, BAR_WIDTH) {
                println!("{}", line);
            }
        }
        Ok(())
    }
}
