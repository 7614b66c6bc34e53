//! Lists the rate plans of a product.
//!
//! Credentials come from `config.yaml` in `$ZUORA_CONFIG`, `./.zuora` or
//! `~/.zuora`, or from `ZUORA_CONFIG__ZUORA__USERNAME` /
//! `ZUORA_CONFIG__ZUORA__PASSWORD`.
//!
//! ```sh
//! RUST_LOG=zuora=debug cargo run -p zuora --example basic_usage -- <product-id>
//! ```

use anyhow::{Context, Result};
use zuora::prelude::*;
use zuoraconfig::Config;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let product_id = std::env::args()
        .nth(1)
        .context("usage: basic_usage <product-id>")?;

    let config = Config::load_config("")?;
    let client = Client::from_config(&config)?;
    println!("Connected to {}", client.endpoint());

    let Some(mut product) = Product::find(&client, &product_id)? else {
        println!("No product {product_id}");
        return Ok(());
    };

    println!("{} ({})", product.name.as_deref().unwrap_or("?"), product_id);
    for mut plan in product.product_rate_plans(&client)?.to_vec() {
        println!("  plan {}", plan.name.as_deref().unwrap_or("?"));

        for charge in plan.product_rate_plan_charges(&client)? {
            println!(
                "    charge {} [{}]",
                charge.name.as_deref().unwrap_or("?"),
                charge
                    .charge_model
                    .map(|m| m.to_string())
                    .unwrap_or_default()
            );
        }
    }

    Ok(())
}
