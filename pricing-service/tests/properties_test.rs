//! Property tests for the price rule, tier ordering, tier editing and matrix reconciliation.

use pricing_service::editor::{reconcile, TierTable, TIER_GAP};
use pricing_service::models::{
    DimensionCombination, DimensionRate, TieredAndVolume, TieredAndVolumeRow, UsagePricingModel,
};
use pricing_service::schema::{self, rules::precision_validation};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn rows(first_units: &[u64]) -> Vec<TieredAndVolumeRow> {
    first_units
        .iter()
        .map(|u| TieredAndVolumeRow {
            first_unit: *u,
            unit_price: "1".to_string(),
            ..Default::default()
        })
        .collect()
}

fn combination() -> impl Strategy<Value = DimensionCombination> {
    prop::collection::btree_map("[a-c]", "[x-z]{1,2}", 1..3)
}

proptest! {
    #[test]
    fn precision_accepts_up_to_limit(
        int in 0u64..1_000_000,
        frac in "[0-9]{0,8}",
        precision in 0usize..9,
        comma in any::<bool>(),
    ) {
        let sep = if comma { "," } else { "." };
        let value = if frac.is_empty() {
            int.to_string()
        } else {
            format!("{}{}{}", int, sep, frac)
        };
        prop_assert_eq!(precision_validation(&value, precision), frac.len() <= precision);
    }

    #[test]
    fn precision_rejects_non_numeric(value in "[a-zA-Z ]{1,8}") {
        prop_assert!(!precision_validation(&value, 8));
    }

    #[test]
    fn tier_rows_accepted_iff_ordered(first_units in prop::collection::vec(0u64..50, 1..6)) {
        let model = UsagePricingModel::Tiered(TieredAndVolume {
            rows: rows(&first_units),
            block_size: None,
        });
        let ordered = first_units[0] == 0 && first_units.windows(2).all(|w| w[1] > w[0]);
        prop_assert_eq!(schema::validate(&model).is_ok(), ordered);
    }

    #[test]
    fn add_tier_steps_by_gap(extra in prop::collection::vec(1u64..500, 1..5)) {
        let mut units = vec![0u64];
        for step in extra {
            let last = *units.last().unwrap();
            units.push(last + step);
        }
        let mut data = TieredAndVolume { rows: rows(&units), block_size: None };
        let mut table = TierTable::new(&mut data);
        let last = table.rows().last().unwrap().first_unit;
        let index = table.add_tier().unwrap();
        prop_assert_eq!(table.rows()[index].first_unit, last + TIER_GAP);
    }

    #[test]
    fn reconcile_matches_target_exactly(
        current in prop::collection::vec(combination(), 0..6),
        target in prop::collection::vec(combination(), 0..6),
    ) {
        let mut rates: Vec<DimensionRate> = current
            .iter()
            .cloned()
            .map(|dimensions| DimensionRate { dimensions, price: "9".to_string() })
            .collect();

        let current_set: BTreeSet<_> = current.iter().cloned().collect();
        let target_set: BTreeSet<_> = target.iter().cloned().collect();

        let report = reconcile(&mut rates, &target);

        let result: BTreeSet<_> = rates.iter().map(|r| r.dimensions.clone()).collect();
        prop_assert_eq!(&result, &target_set);
        prop_assert_eq!(rates.len(), target_set.len());

        let added: BTreeSet<_> = report.added.iter().cloned().collect();
        let expected_added: BTreeSet<_> = target_set.difference(&current_set).cloned().collect();
        prop_assert_eq!(added, expected_added);

        let removed: BTreeSet<_> = report.removed.iter().cloned().collect();
        let expected_removed: BTreeSet<_> = current_set.difference(&target_set).cloned().collect();
        prop_assert!(expected_removed.is_subset(&removed));

        prop_assert!(reconcile(&mut rates, &target).is_noop());
    }
}
