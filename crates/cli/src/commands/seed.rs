//! Seed the storefront with demo accounts and the printer catalog.
//!
//! Safe to run repeatedly: users are matched by email and products by name,
//! and anything already present is left untouched.

use std::collections::HashSet;

use aneka_citra_core::catalog::ProductDraft;
use aneka_citra_core::{Email, Role, SpecEntry};
use aneka_citra_storefront::db::{ProductRepository, UserRepository};
use aneka_citra_storefront::services::auth::{AuthService, Registrar, Registration};
use tracing::info;

use super::connect;

const IMAGE_URL: &str = "https://images.unsplash.com/photo-1612815154858-60aa4c59eaa6?w=500";

/// A demo account.
struct SeedUser {
    email: &'static str,
    name: &'static str,
    password: &'static str,
    admin: bool,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        email: "admin@anekacitra.com",
        name: "Admin Aneka Citra",
        password: "admin123",
        admin: true,
    },
    SeedUser {
        email: "fiqih@gmail.com",
        name: "Fiqih Customer",
        password: "customer123",
        admin: false,
    },
    SeedUser {
        email: "aku@gmail.com",
        name: "Aku Customer",
        password: "customer123",
        admin: false,
    },
];

/// A catalog entry: name, brand, price (IDR), stock, technology, connectivity, description.
type SeedProduct = (&'static str, &'static str, i64, i64, &'static str, &'static str, &'static str);

const PRODUCTS: &[SeedProduct] = &[
    (
        "Canon PIXMA G1020",
        "Canon",
        2_250_000,
        15,
        "Inkjet",
        "USB",
        "Printer ink tank system dengan hasil cetak berkualitas tinggi untuk kebutuhan rumah dan kantor kecil. Hemat biaya operasional dengan sistem tinta refillable.",
    ),
    (
        "Epson L3110",
        "Epson",
        2_100_000,
        20,
        "Inkjet",
        "USB",
        "Printer multifungsi dengan teknologi Epson EcoTank yang dapat mencetak, scan, dan fotokopi. Tinta original untuk hasil cetak tahan lama.",
    ),
    (
        "HP DeskJet 2336",
        "HP",
        950_000,
        12,
        "Inkjet",
        "USB",
        "Printer all-in-one yang kompak dan terjangkau untuk mencetak dokumen dan foto dengan mudah di rumah. Cocok untuk pengguna casual.",
    ),
    (
        "Brother DCP-T420W",
        "Brother",
        2_400_000,
        8,
        "Inkjet",
        "WiFi, USB",
        "Printer multifungsi dengan fitur WiFi untuk kemudahan mencetak dari smartphone atau tablet. Sistem ink tank ekonomis untuk volume cetak tinggi.",
    ),
    (
        "Canon PIXMA iP2770",
        "Canon",
        650_000,
        18,
        "Inkjet",
        "USB",
        "Printer inkjet sederhana dan andal untuk kebutuhan cetak dokumen sehari-hari. Hemat energi dan mudah digunakan.",
    ),
    (
        "Epson L3150",
        "Epson",
        3_100_000,
        10,
        "Inkjet",
        "WiFi, WiFi Direct, USB",
        "Printer all-in-one dengan WiFi dan WiFi Direct untuk kemudahan koneksi nirkabel. Dilengkapi layar LCD untuk operasi yang lebih mudah.",
    ),
    (
        "HP LaserJet Pro M15w",
        "HP",
        1_850_000,
        6,
        "Laser",
        "WiFi, USB",
        "Printer laser monochrome kompak dengan konektivitas nirkabel. Kecepatan cetak tinggi dan ideal untuk dokumen bisnis profesional.",
    ),
    (
        "Brother HL-L2321D",
        "Brother",
        1_950_000,
        14,
        "Laser",
        "USB",
        "Printer laser monochrome dengan automatic duplex printing untuk menghemat kertas. Sempurna untuk kebutuhan kantor dengan volume cetak sedang.",
    ),
];

fn draft(product: &SeedProduct) -> ProductDraft {
    let (name, brand, price_cents, stock, technology, connectivity, description) = *product;
    ProductDraft {
        name: name.to_owned(),
        brand: brand.to_owned(),
        price_cents,
        stock,
        description: description.to_owned(),
        specifications: vec![
            SpecEntry::new("Teknologi Cetak", technology),
            SpecEntry::new("Konektivitas", connectivity),
            SpecEntry::new("Kondisi", "Baru"),
        ],
        image_url: IMAGE_URL.to_owned(),
    }
}

/// Insert demo users and products that are not there yet.
///
/// # Errors
///
/// Returns an error if the database is unreachable, a write fails, or a
/// built-in record fails validation.
pub async fn demo() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool);
    let auth = AuthService::new(&pool);

    for seed in USERS {
        let email = Email::parse(seed.email)?;
        if users.get_by_email(&email).await?.is_some() {
            info!("User already exists: {}", seed.email);
            continue;
        }

        let registration = Registration {
            email: seed.email,
            password: seed.password,
            name: Some(seed.name),
        };
        let role = if seed.admin { Role::Admin } else { Role::Customer };
        let user = auth
            .register(registration, Some(role), Registrar::SuperAdmin)
            .await?;
        info!("User created: {} ({})", user.email, user.role);
    }

    let products = ProductRepository::new(&pool);
    let existing: HashSet<String> = products
        .list()
        .await?
        .into_iter()
        .map(|product| product.name)
        .collect();

    for seed in PRODUCTS {
        let draft = draft(seed);
        if existing.contains(&draft.name) {
            info!("Product already exists: {}", draft.name);
            continue;
        }
        let created = products.create(&draft.validate()?).await?;
        info!("Product created: {}", created.name);
    }

    info!("Seeding complete! {} products in catalog", products.count().await?);
    Ok(())
}
