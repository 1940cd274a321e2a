//! Catalog seeding for local development.
//!
//! Inserts a small set of categories and products so the storefront has
//! something to render. No-op when the catalog already has products, so the
//! command is safe to run repeatedly.

use chrono::Utc;

use marigold_server::db::products::ProductFilter;
use marigold_server::db::{CategoryRepository, ProductRepository};
use marigold_server::models::{Category, Product};

use super::CliError;

/// Placeholder image used for every seeded product slot.
const PLACEHOLDER_IMAGE: &str = "https://placehold.co/1600x1600/f5f0e8/333333?text=Marigold";

/// Seed the catalog with sample data.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CliError> {
    let (_client, db) = super::connect_from_env().await?;
    let categories = CategoryRepository::new(&db);
    let products = ProductRepository::new(&db);

    let existing = products.count(&ProductFilter::default()).await?;
    if existing > 0 {
        tracing::info!(count = existing, "Catalog already has products, nothing to seed");
        return Ok(());
    }

    tracing::info!("Seeding catalog...");

    let men = categories
        .create(&Category {
            id: None,
            name: "Men".to_string(),
            description: "Menswear essentials".to_string(),
            image: None,
            is_active: true,
        })
        .await?;
    let women = categories
        .create(&Category {
            id: None,
            name: "Women".to_string(),
            description: "Womenswear essentials".to_string(),
            image: None,
            is_active: true,
        })
        .await?;
    let accessories = categories
        .create(&Category {
            id: None,
            name: "Accessories".to_string(),
            description: "Bags, belts and more".to_string(),
            image: None,
            is_active: true,
        })
        .await?;

    let samples = [
        (
            "Linen Kurta",
            "Breathable full-sleeve linen kurta in natural beige.",
            1499.0,
            1999.0,
            men,
            vec!["S", "M", "L", "XL"],
            25,
            true,
            false,
        ),
        (
            "Slim Fit Chinos",
            "Stretch cotton chinos with a tapered leg.",
            1799.0,
            2299.0,
            men,
            vec!["30", "32", "34", "36"],
            40,
            false,
            true,
        ),
        (
            "Block Print Saree",
            "Hand block printed mul cotton saree with running blouse piece.",
            2899.0,
            3499.0,
            women,
            vec![],
            12,
            true,
            true,
        ),
        (
            "Embroidered Dupatta",
            "Chanderi dupatta with zari border.",
            999.0,
            1299.0,
            women,
            vec![],
            30,
            false,
            false,
        ),
        (
            "Jute Tote Bag",
            "Everyday tote in natural jute with cotton lining.",
            649.0,
            849.0,
            accessories,
            vec![],
            60,
            false,
            false,
        ),
    ];

    let now = Utc::now();
    for (name, description, price, mrp, category, sizes, stock, featured, bestseller) in samples {
        let id = products
            .create(&Product {
                id: None,
                name: name.to_string(),
                description: description.to_string(),
                price,
                mrp,
                category,
                brand: "Marigold".to_string(),
                stock,
                images: vec![PLACEHOLDER_IMAGE.to_string(); 4],
                sizes: sizes.into_iter().map(str::to_string).collect(),
                is_featured: featured,
                is_bestseller: bestseller,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
        tracing::info!(product = name, id = %id.to_hex(), "Seeded product");
    }

    tracing::info!("Seeding complete: 3 categories, 5 products");
    Ok(())
}
