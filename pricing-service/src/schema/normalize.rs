//! Rewrites accepted price strings into canonical decimal form.

use super::rules::canonical_price;
use crate::models::{
    AddPriceComponent, CapacityFee, EditPriceComponent, FeeType, FormPriceComponent,
    PriceComponent, TermRate, UsageFee, UsagePricingModel,
};

/// Canonicalize every price field in place (`"12,5"` becomes `"12.5"`).
///
/// Only meant for values that already passed validation; strings that do not
/// parse are left untouched.
pub trait NormalizePrices {
    fn normalize_prices(&mut self);
}

fn normalize(price: &mut String) {
    if let Some(canonical) = canonical_price(price) {
        *price = canonical;
    }
}

fn normalize_opt(price: &mut Option<String>) {
    if let Some(price) = price {
        normalize(price);
    }
}

fn normalize_rates(rates: &mut [TermRate]) {
    for rate in rates {
        normalize(&mut rate.price);
    }
}

impl NormalizePrices for UsagePricingModel {
    fn normalize_prices(&mut self) {
        match self {
            UsagePricingModel::PerUnit(data) => normalize(&mut data.unit_price),
            UsagePricingModel::Tiered(data) | UsagePricingModel::Volume(data) => {
                for row in &mut data.rows {
                    normalize(&mut row.unit_price);
                    normalize_opt(&mut row.flat_fee);
                    normalize_opt(&mut row.flat_cap);
                }
            }
            UsagePricingModel::Package(data) => normalize(&mut data.package_price),
            UsagePricingModel::Matrix(data) => {
                for rate in &mut data.dimension_rates {
                    normalize(&mut rate.price);
                }
            }
        }
    }
}

impl NormalizePrices for UsageFee {
    fn normalize_prices(&mut self) {
        self.model.normalize_prices();
    }
}

impl NormalizePrices for CapacityFee {
    fn normalize_prices(&mut self) {
        for threshold in &mut self.thresholds {
            normalize(&mut threshold.price);
            normalize(&mut threshold.per_unit_overage);
        }
    }
}

impl NormalizePrices for FeeType {
    fn normalize_prices(&mut self) {
        match self {
            FeeType::Rate(data) => normalize_rates(&mut data.rates),
            FeeType::Slot(data) => normalize_rates(&mut data.rates),
            FeeType::Capacity(data) => data.normalize_prices(),
            FeeType::Usage(data) => data.normalize_prices(),
            FeeType::ExtraRecurring(data) => normalize(&mut data.unit_price),
            FeeType::OneTime(data) => normalize(&mut data.unit_price),
        }
    }
}

macro_rules! normalize_fee_envelope {
    ($($ty:ty),*) => {
        $(
            impl NormalizePrices for $ty {
                fn normalize_prices(&mut self) {
                    self.fee.normalize_prices();
                }
            }
        )*
    };
}

normalize_fee_envelope!(PriceComponent, AddPriceComponent, EditPriceComponent, FormPriceComponent);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TieredAndVolume, TieredAndVolumeRow};

    #[test]
    fn test_comma_prices_become_canonical() {
        let mut model = UsagePricingModel::Volume(TieredAndVolume {
            rows: vec![TieredAndVolumeRow {
                first_unit: 0,
                unit_price: "0,25".to_string(),
                flat_fee: Some("10,5".to_string()),
                flat_cap: None,
            }],
            block_size: None,
        });
        model.normalize_prices();

        let UsagePricingModel::Volume(data) = model else {
            panic!("model kind changed");
        };
        assert_eq!(data.rows[0].unit_price, "0.25");
        assert_eq!(data.rows[0].flat_fee.as_deref(), Some("10.5"));
        assert_eq!(data.rows[0].flat_cap, None);
    }

    #[test]
    fn test_normalized_fee_still_validates() {
        let mut fee = FeeType::OneTime(crate::models::OneTimeFee {
            unit_price: "1e-9".to_string(),
            quantity: 1,
        });
        assert!(crate::schema::validate(&fee).is_ok());

        fee.normalize_prices();

        let FeeType::OneTime(data) = &fee else {
            panic!("fee kind changed");
        };
        assert_eq!(data.unit_price, "1e-9");
        assert!(crate::schema::validate(&fee).is_ok());
    }

    #[test]
    fn test_unparseable_price_left_alone() {
        let mut price = "n/a".to_string();
        normalize(&mut price);
        assert_eq!(price, "n/a");
    }
}
