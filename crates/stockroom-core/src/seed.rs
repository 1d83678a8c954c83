//! Synthetic sales for demos and manual testing.
//!
//! Generates random sale events over the calendar months leading up to a
//! given day. The output is plain [`NewSale`] data; callers store it through
//! any [`Store`](crate::store::Store), after which it is indistinguishable
//! from recorded sales.

use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;

use crate::models::NewSale;

/// Shape of the generated history.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    /// Calendar months to cover, counting the month of `end`.
    pub months: u32,
    /// Upper bound of events per article per month (lower bound is zero).
    pub max_events_per_month: u32,
    /// Upper bound of a single event's quantity (lower bound is one).
    pub max_quantity: i64,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            months: 12,
            max_events_per_month: 5,
            max_quantity: 10,
        }
    }
}

/// Generates sales for every code, dated no later than `end`.
pub fn generate_sales<R: Rng>(
    rng: &mut R,
    codes: &[String],
    end: NaiveDate,
    plan: &SeedPlan,
) -> Vec<NewSale> {
    let mut sales = Vec::new();
    if plan.max_quantity < 1 {
        return sales;
    }
    let Some(end_month) = end.with_day(1) else {
        return sales;
    };

    for offset in (0..plan.months).rev() {
        let Some(first) = end_month.checked_sub_months(Months::new(offset)) else {
            continue;
        };
        let last_day = if offset == 0 {
            end.day()
        } else {
            days_in_month(first)
        };

        for code in codes {
            let events = rng.gen_range(0..=plan.max_events_per_month);
            for _ in 0..events {
                let day = rng.gen_range(1..=last_day);
                let Some(date) = first.with_day(day) else {
                    continue;
                };
                sales.push(NewSale {
                    article_code: code.clone(),
                    date,
                    quantity: rng.gen_range(1..=plan.max_quantity),
                });
            }
        }
    }

    sales
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::aggregate::monthly_totals;
    use crate::models::Sale;

    fn codes() -> Vec<String> {
        vec!["A1".to_string(), "B2".to_string()]
    }

    #[test]
    fn test_dates_and_quantities_in_bounds() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let plan = SeedPlan {
            months: 6,
            max_events_per_month: 8,
            max_quantity: 4,
        };
        let start = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        let sales = generate_sales(&mut StdRng::seed_from_u64(7), &codes(), end, &plan);

        assert!(!sales.is_empty());
        for s in &sales {
            assert!(s.date >= start && s.date <= end, "{} out of range", s.date);
            assert!((1..=4).contains(&s.quantity));
            assert!(s.validate().is_ok());
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let plan = SeedPlan::default();
        let a = generate_sales(&mut StdRng::seed_from_u64(42), &codes(), end, &plan);
        let b = generate_sales(&mut StdRng::seed_from_u64(42), &codes(), end, &plan);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_months_or_no_codes_is_empty() {
        let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SeedPlan {
            months: 0,
            ..SeedPlan::default()
        };
        assert!(generate_sales(&mut rng, &codes(), end, &plan).is_empty());
        assert!(generate_sales(&mut rng, &[], end, &SeedPlan::default()).is_empty());
    }

    #[test]
    fn test_generated_sales_aggregate_into_covered_months() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let plan = SeedPlan {
            months: 12,
            max_events_per_month: 3,
            max_quantity: 5,
        };
        let generated = generate_sales(&mut StdRng::seed_from_u64(3), &codes(), end, &plan);
        let sales: Vec<Sale> = generated
            .iter()
            .filter(|s| s.article_code == "A1")
            .enumerate()
            .map(|(i, s)| Sale {
                id: i as i64,
                article_code: s.article_code.clone(),
                date: s.date,
                quantity: s.quantity,
            })
            .collect();

        let series = monthly_totals(&sales);
        assert!(series.len() <= 12);
        assert!(series.iter().all(|m| m.period.starts_with("2024-")));
        let sum: i64 = sales.iter().map(|s| s.quantity).sum();
        assert_eq!(series.iter().map(|m| m.quantity).sum::<i64>(), sum);
    }
}
