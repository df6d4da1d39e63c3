use crate::client::ApiClient;
use anyhow::{Context, Result};
use clap::Args;
use cliclack::{intro, log, outro};
use shared::dto::CreateProductRequest;
use std::path::PathBuf;

const SAMPLE_PRODUCTS: &str = include_str!("../sample_products.json");

/// Creates products in bulk through the text-only endpoint.
#[derive(Args, Debug)]
pub struct SeedCommand {
    /// JSON array of products; the built-in sample catalog is used otherwise
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub fn parse_products(json: &str) -> Result<Vec<CreateProductRequest>> {
    serde_json::from_str(json).context("Expected a JSON array of products")
}

impl SeedCommand {
    fn load(&self) -> Result<Vec<CreateProductRequest>> {
        match &self.file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                parse_products(&content)
            }
            None => parse_products(SAMPLE_PRODUCTS),
        }
    }

    pub async fn execute(&self, client: &ApiClient) -> Result<()> {
        intro(console::style("Seed catalog").bold())?;

        let products = self.load()?;
        let mut created = 0;
        for req in &products {
            match client.create_text_only(req).await {
                Ok(p) => {
                    created += 1;
                    log::success(format!("#{} {}", p.id, p.name))?;
                }
                Err(e) => log::error(format!("{}: {}", req.name, e))?,
            }
        }

        outro(format!("Created {} of {} product(s)", created, products.len()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_sample_parses() {
        let products = parse_products(SAMPLE_PRODUCTS).unwrap();
        assert_eq!(products.len(), 10);
        assert!(products.iter().all(|p| !p.name.is_empty()));
        assert_eq!(products[0].name, "Wireless Mouse");
        assert_eq!(products[0].price, Some(29.99));
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let products =
            parse_products(r#"[{"name": "Stool", "description": "Three legs"}]"#).unwrap();
        assert_eq!(products[0].category, None);
        assert_eq!(products[0].price, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "Rug", "description": "Wool", "price": 80}}]"#).unwrap();

        let cmd = SeedCommand {
            file: Some(file.path().to_path_buf()),
        };
        let products = cmd.load().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, Some(80.0));
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(parse_products(r#"{"name": "Rug"}"#).is_err());
    }
}
