//! Core data models shared by the importer, the aggregator, and every store.
//!
//! An [`Article`] is a stocked part identified by its unique `code`. A
//! [`Sale`] is a dated quantity-sold event owned by exactly one article.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A persisted article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub code: String,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Field set for an article that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// A persisted sale event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sale {
    pub id: i64,
    pub article_code: String,
    pub date: NaiveDate,
    pub quantity: i64,
}

/// A sale event that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub article_code: String,
    pub date: NaiveDate,
    pub quantity: i64,
}

/// Largest quantity a single sale may carry. Keeps monthly sums far from
/// `i64` overflow.
pub const MAX_SALE_QUANTITY: i64 = i32::MAX as i64;

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("quantity must be >= {min}, got {value}")]
    QuantityTooLow { min: i64, value: i64 },
    #[error("quantity must be <= {max}, got {value}")]
    QuantityTooHigh { max: i64, value: i64 },
    #[error("unit_price must be a positive number, got {0}")]
    InvalidPrice(f64),
    #[error("unit_price must be >= {min}, got {value}")]
    PriceTooLow { min: f64, value: f64 },
}

impl NewArticle {
    /// Checks the invariants every stored article holds: non-empty code and
    /// name, non-negative quantity, positive finite unit price.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::Empty("code"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty("name"));
        }
        validate_stock(self.quantity, self.unit_price)
    }

    pub fn into_article(self) -> Article {
        Article {
            code: self.code,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

/// Validates the two mutable stock fields of an article.
pub fn validate_stock(quantity: i64, unit_price: f64) -> Result<(), ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::QuantityTooLow {
            min: 0,
            value: quantity,
        });
    }
    if !unit_price.is_finite() || unit_price <= 0.0 {
        return Err(ValidationError::InvalidPrice(unit_price));
    }
    Ok(())
}

impl NewSale {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.article_code.trim().is_empty() {
            return Err(ValidationError::Empty("article code"));
        }
        if self.quantity < 1 {
            return Err(ValidationError::QuantityTooLow {
                min: 1,
                value: self.quantity,
            });
        }
        if self.quantity > MAX_SALE_QUANTITY {
            return Err(ValidationError::QuantityTooHigh {
                max: MAX_SALE_QUANTITY,
                value: self.quantity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt() -> NewArticle {
        NewArticle {
            code: "A1".to_string(),
            name: "Bolt".to_string(),
            description: "Steel bolt".to_string(),
            quantity: 10,
            unit_price: 0.5,
        }
    }

    #[test]
    fn test_valid_article() {
        assert!(bolt().validate().is_ok());
    }

    #[test]
    fn test_zero_quantity_is_allowed() {
        let mut a = bolt();
        a.quantity = 0;
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_blank_code_rejected() {
        let mut a = bolt();
        a.code = "  ".to_string();
        assert_eq!(a.validate(), Err(ValidationError::Empty("code")));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let mut a = bolt();
        a.quantity = -1;
        assert!(matches!(
            a.validate(),
            Err(ValidationError::QuantityTooLow { min: 0, value: -1 })
        ));
    }

    #[test]
    fn test_price_must_be_positive_and_finite() {
        for price in [0.0, -2.5, f64::NAN, f64::INFINITY] {
            let mut a = bolt();
            a.unit_price = price;
            assert!(a.validate().is_err(), "price {} accepted", price);
        }
    }

    #[test]
    fn test_sale_quantity_must_be_positive() {
        let sale = NewSale {
            article_code: "A1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            quantity: 0,
        };
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_sale_quantity_is_capped() {
        let mut sale = NewSale {
            article_code: "A1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            quantity: MAX_SALE_QUANTITY,
        };
        assert!(sale.validate().is_ok());

        sale.quantity = i64::MAX / 2 + 1;
        assert_eq!(
            sale.validate(),
            Err(ValidationError::QuantityTooHigh {
                max: MAX_SALE_QUANTITY,
                value: i64::MAX / 2 + 1,
            })
        );
    }
}
