use crate::client::ApiClient;
use crate::ui;
use anyhow::Result;
use clap::Args;
use cliclack::{intro, log, outro};
use shared::dto::CreateProductRequest;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only show products in this category
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}

impl ListCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        let products = client
            .list_products(self.skip, self.limit, self.category.as_deref())
            .await?;

        if products.is_empty() {
            println!("No products found.");
            return Ok(());
        }
        println!("{}", ui::products_table(&products));
        println!("{} product(s)", console::style(products.len()).bold());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowCommand {
    pub id: i32,
}

impl ShowCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        let product = client.get_product(self.id).await?;
        println!("{}", ui::product_detail(&product));
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddCommand {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    /// Product image; uploaded with the product when given
    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl AddCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        intro(console::style("Add product").bold())?;

        let req = CreateProductRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
        };

        let product = match &self.image {
            Some(path) => {
                log::info(format!("Uploading {}", path.display()))?;
                client.create_with_image(&req, path).await?
            }
            None => client.create_text_only(&req).await?,
        };

        if !product.has_text_embedding {
            log::warning("Text embedding could not be generated")?;
        }
        if self.image.is_some() && !product.has_multimodal_embedding {
            log::warning("Multimodal embedding could not be generated")?;
        }

        outro(format!(
            "Created {} with ID {}",
            console::style(&product.name).cyan(),
            console::style(product.id).bold()
        ))?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteCommand {
    pub id: i32,
}

impl DeleteCommand {
    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        let res = client.delete_product(self.id).await?;
        log::success(res.message)?;
        Ok(())
    }
}
