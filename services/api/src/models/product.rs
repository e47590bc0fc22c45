//! Marketplace products, pricing and purchase quotes
//!
//! Prices are stored as text normalised to two decimals and parsed at read
//! time. A product is sold out when it tracks stock and the stock is zero or
//! less; products without a stock figure never sell out.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{optional, required};

pub const PRODUCT_CATEGORIES: &[&str] = &[
    "Ração",
    "Brinquedos",
    "Coleiras",
    "Medicamentos",
    "Higiene",
    "Acessórios",
    "Outros",
];

/// Filter value meaning "every category"
pub const ALL_CATEGORIES: &str = "Todos";

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: String,
    pub contact: String,
    pub image_base64: Option<String>,
    pub stock: Option<i32>,
    pub category: String,
    pub owner_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accepts a decimal comma
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}

/// Validate a user-entered price and store it with two decimals
pub fn normalize_price(raw: &str) -> Result<String, String> {
    let price = parse_price(raw).ok_or_else(|| "Price must be a number".to_string())?;
    if price <= 0.0 {
        return Err("Price must be greater than zero".to_string());
    }
    Ok(format_money(price))
}

pub fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

/// At least one unit, and never more than the stock on hand
pub fn clamp_quantity(requested: u32, stock: Option<i32>) -> u32 {
    let quantity = requested.max(1);
    match stock {
        Some(available) if available > 0 => quantity.min(available as u32),
        _ => quantity,
    }
}

/// wa.me link when the contact holds a Brazilian phone number
pub fn whatsapp_link(contact: &str, text: &str) -> Option<String> {
    let digits: String = contact.chars().filter(|c| c.is_ascii_digit()).collect();

    let number = match digits.len() {
        10 | 11 => format!("55{}", digits),
        12 | 13 if digits.starts_with("55") => digits,
        _ => return None,
    };

    Url::parse_with_params(&format!("https://wa.me/{}", number), &[("text", text)])
        .ok()
        .map(String::from)
}

/// Why a product cannot be bought right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseRefusal {
    SoldOut,
    Inactive,
    Unpriced,
}

impl fmt::Display for PurchaseRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PurchaseRefusal::SoldOut => "Product is sold out",
            PurchaseRefusal::Inactive => "Product is not available",
            PurchaseRefusal::Unpriced => "Product has no valid price",
        })
    }
}

impl Product {
    pub fn unit_price(&self) -> Option<f64> {
        parse_price(&self.price)
    }

    pub fn is_sold_out(&self) -> bool {
        matches!(self.stock, Some(stock) if stock <= 0)
    }

    /// Checks in the order a buyer would see them
    pub fn availability(&self) -> Result<f64, PurchaseRefusal> {
        if !self.active {
            return Err(PurchaseRefusal::Inactive);
        }
        if self.is_sold_out() {
            return Err(PurchaseRefusal::SoldOut);
        }
        self.unit_price().ok_or(PurchaseRefusal::Unpriced)
    }

    fn interest_message(&self, quantity: u32) -> String {
        format!(
            "Olá! Tenho interesse em {}x {} (R$ {}) anunciado no PetLoc.",
            quantity, self.name, self.price
        )
    }

    /// Quote for buying `requested` units; stock is not reserved
    pub fn quote(&self, requested: Option<u32>) -> Result<PurchaseQuote, PurchaseRefusal> {
        let unit_price = self.availability()?;
        let quantity = clamp_quantity(requested.unwrap_or(1), self.stock);

        Ok(PurchaseQuote {
            product_id: self.id,
            name: self.name.clone(),
            quantity,
            unit_price: format_money(unit_price),
            total: format_money(unit_price * f64::from(quantity)),
            contact: self.contact.clone(),
            whatsapp_url: whatsapp_link(&self.contact, &self.interest_message(quantity)),
        })
    }
}

/// Product page view
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub sold_out: bool,
    pub purchasable: bool,
    pub unit_price: Option<f64>,
    pub quantity: u32,
    /// Absent whenever the product cannot be bought
    pub total: Option<String>,
    pub whatsapp_url: Option<String>,
}

impl ProductDetail {
    pub fn new(product: Product, requested: Option<u32>) -> Self {
        let quote = product.quote(requested).ok();
        let quantity = quote
            .as_ref()
            .map(|q| q.quantity)
            .unwrap_or_else(|| clamp_quantity(requested.unwrap_or(1), product.stock));

        Self {
            sold_out: product.is_sold_out(),
            purchasable: quote.is_some(),
            unit_price: product.unit_price(),
            quantity,
            total: quote.as_ref().map(|q| q.total.clone()),
            whatsapp_url: quote.and_then(|q| q.whatsapp_url),
            product,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseQuote {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total: String,
    pub contact: String,
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: String,
    pub contact: String,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
    pub category: String,
}

impl NewProduct {
    pub fn validate(self) -> Result<Self, String> {
        let category = self.category.trim().to_string();
        if !PRODUCT_CATEGORIES.contains(&category.as_str()) {
            return Err(format!("Unknown category: {}", category));
        }

        if matches!(self.stock, Some(stock) if stock < 0) {
            return Err("Stock cannot be negative".to_string());
        }

        Ok(Self {
            name: required(&self.name, "Name")?,
            description: required(&self.description, "Description")?,
            price: normalize_price(&self.price)?,
            contact: required(&self.contact, "Contact")?,
            image_base64: optional(self.image_base64),
            stock: self.stock,
            category,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

impl ProductQuery {
    /// Category to filter on; `Todos` and blank mean none
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QuantityQuery {
    pub quantity: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: &str, stock: Option<i32>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Ração Premium".to_string(),
            description: "15kg".to_string(),
            price: price.to_string(),
            contact: "(11) 98888-7777".to_string(),
            image_base64: None,
            stock,
            category: "Ração".to_string(),
            owner_id: Uuid::new_v4(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_zero_stock_is_sold_out_without_total() {
        let detail = ProductDetail::new(product("49.90", Some(0)), Some(2));

        assert!(detail.sold_out);
        assert!(!detail.purchasable);
        assert_eq!(detail.total, None);
        assert_eq!(detail.unit_price, Some(49.90));
        assert_eq!(
            product("49.90", Some(0)).quote(None).unwrap_err(),
            PurchaseRefusal::SoldOut
        );
    }

    #[test]
    fn test_total_is_price_times_clamped_quantity() {
        let detail = ProductDetail::new(product("49.90", Some(3)), Some(5));
        assert_eq!(detail.quantity, 3);
        assert_eq!(detail.total.as_deref(), Some("149.70"));

        let untracked = ProductDetail::new(product("10", None), Some(4));
        assert!(!untracked.sold_out);
        assert_eq!(untracked.total.as_deref(), Some("40.00"));

        let zero = ProductDetail::new(product("10", None), Some(0));
        assert_eq!(zero.quantity, 1);
    }

    #[test]
    fn test_inactive_product_not_purchasable() {
        let mut p = product("10.00", Some(5));
        p.active = false;
        assert_eq!(p.quote(Some(1)).unwrap_err(), PurchaseRefusal::Inactive);
        assert!(!ProductDetail::new(p, None).purchasable);
    }

    #[test]
    fn test_price_normalisation() {
        assert_eq!(normalize_price("49,9").unwrap(), "49.90");
        assert_eq!(normalize_price(" 12 ").unwrap(), "12.00");
        assert!(normalize_price("0").is_err());
        assert!(normalize_price("-3").is_err());
        assert!(normalize_price("abc").is_err());
        assert!(normalize_price("NaN").is_err());
    }

    #[test]
    fn test_whatsapp_link() {
        let link = whatsapp_link("(11) 98888-7777", "Olá").unwrap();
        assert!(link.starts_with("https://wa.me/5511988887777?text="));

        assert!(whatsapp_link("+55 11 98888-7777", "x").unwrap().contains("5511988887777"));
        assert_eq!(whatsapp_link("vendedor@example.com", "x"), None);
        assert_eq!(whatsapp_link("1234", "x"), None);
    }

    #[test]
    fn test_new_product_validation() {
        let new_product = NewProduct {
            name: "Bolinha".to_string(),
            description: "Borracha".to_string(),
            price: "7,5".to_string(),
            contact: "11988887777".to_string(),
            image_base64: None,
            stock: Some(10),
            category: "Brinquedos".to_string(),
        };

        let valid = new_product.clone().validate().unwrap();
        assert_eq!(valid.price, "7.50");

        let mut bad = new_product.clone();
        bad.category = "Todos".to_string();
        assert!(bad.validate().is_err());

        let mut negative = new_product;
        negative.stock = Some(-1);
        assert_eq!(negative.validate().unwrap_err(), "Stock cannot be negative");
    }

    #[test]
    fn test_category_filter() {
        let all = ProductQuery {
            category: Some("Todos".to_string()),
        };
        assert_eq!(all.category(), None);
        let toys = ProductQuery {
            category: Some("Brinquedos".to_string()),
        };
        assert_eq!(toys.category(), Some("Brinquedos"));
    }
}
