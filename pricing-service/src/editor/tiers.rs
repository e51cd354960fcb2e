//! Tier table shared by the tiered and volume sub-editors.

use std::fmt;

use super::EditError;
use crate::models::{TieredAndVolume, TieredAndVolumeRow};

/// First units of the rows a blank table starts with.
pub const DEFAULT_FIRST_UNITS: [u64; 2] = [0, 100];

/// Distance between a new tier and the previous last tier.
pub const TIER_GAP: u64 = 2;

/// The table never drops below this many rows.
pub const MIN_TIERS: usize = 2;

/// Derived upper end of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastUnit {
    Bounded(u64),
    Unbounded,
}

impl fmt::Display for LastUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastUnit::Bounded(unit) => write!(f, "{}", unit),
            LastUnit::Unbounded => f.write_str("∞"),
        }
    }
}

/// Editing view over the rows of a tiered or volume model.
///
/// Bounds and last units are computed from the neighbouring rows on every
/// call; nothing derived is stored.
#[derive(Debug)]
pub struct TierTable<'a> {
    data: &'a mut TieredAndVolume,
}

impl<'a> TierTable<'a> {
    pub fn new(data: &'a mut TieredAndVolume) -> Self {
        Self { data }
    }

    /// Seed the default rows when the table is empty. Returns `true` if seeded.
    pub fn ensure_seeded(&mut self) -> bool {
        if !self.data.rows.is_empty() {
            return false;
        }
        self.data.rows = DEFAULT_FIRST_UNITS
            .iter()
            .map(|unit| TieredAndVolumeRow::new(*unit))
            .collect();
        true
    }

    pub fn rows(&self) -> &[TieredAndVolumeRow] {
        &self.data.rows
    }

    pub fn len(&self) -> usize {
        self.data.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.rows.is_empty()
    }

    pub fn block_size(&self) -> Option<u64> {
        self.data.block_size
    }

    pub fn set_block_size(&mut self, block_size: Option<u64>) {
        self.data.block_size = block_size;
    }

    /// Append a tier after the current last one and return its index.
    pub fn add_tier(&mut self) -> Result<usize, EditError> {
        if self.ensure_seeded() {
            return Ok(self.data.rows.len() - 1);
        }
        let next = match self.data.rows.last() {
            Some(row) => row
                .first_unit
                .checked_add(TIER_GAP)
                .ok_or(EditError::NoRoomAfter(row.first_unit))?,
            None => 0,
        };
        self.data.rows.push(TieredAndVolumeRow::new(next));
        Ok(self.data.rows.len() - 1)
    }

    pub fn can_remove(&self, index: usize) -> bool {
        index != 0 && index < self.data.rows.len() && self.data.rows.len() > MIN_TIERS
    }

    pub fn remove_tier(&mut self, index: usize) -> Result<TieredAndVolumeRow, EditError> {
        self.row(index)?;
        if index == 0 {
            return Err(EditError::FirstRowLocked);
        }
        if self.data.rows.len() <= MIN_TIERS {
            return Err(EditError::TooFewRows { min: MIN_TIERS });
        }
        Ok(self.data.rows.remove(index))
    }

    /// Lowest first unit row `index` may take, `None` for the locked first row.
    pub fn min_first_unit(&self, index: usize) -> Option<u64> {
        if index == 0 {
            return None;
        }
        self.data
            .rows
            .get(index - 1)
            .map(|prev| prev.first_unit.saturating_add(TIER_GAP))
    }

    /// Highest first unit row `index` may take, `None` when unbounded.
    pub fn max_first_unit(&self, index: usize) -> Option<u64> {
        self.data
            .rows
            .get(index + 1)
            .map(|next| next.first_unit.saturating_sub(TIER_GAP))
    }

    pub fn set_first_unit(&mut self, index: usize, value: u64) -> Result<(), EditError> {
        self.row(index)?;
        if index == 0 {
            return Err(EditError::FirstRowLocked);
        }
        if let Some(min) = self.min_first_unit(index).filter(|min| value < *min) {
            return Err(EditError::BelowMinimum { value, min });
        }
        if let Some(max) = self.max_first_unit(index).filter(|max| value > *max) {
            return Err(EditError::AboveMaximum { value, max });
        }
        self.data.rows[index].first_unit = value;
        Ok(())
    }

    /// Next row's first unit minus one, or unbounded for the last row.
    pub fn last_unit(&self, index: usize) -> Option<LastUnit> {
        self.data.rows.get(index)?;
        Some(match self.data.rows.get(index + 1) {
            Some(next) => LastUnit::Bounded(next.first_unit.saturating_sub(1)),
            None => LastUnit::Unbounded,
        })
    }

    pub fn set_unit_price(&mut self, index: usize, price: impl Into<String>) -> Result<(), EditError> {
        self.row_mut(index)?.unit_price = price.into();
        Ok(())
    }

    pub fn set_flat_fee(&mut self, index: usize, fee: Option<String>) -> Result<(), EditError> {
        self.row_mut(index)?.flat_fee = fee;
        Ok(())
    }

    pub fn set_flat_cap(&mut self, index: usize, cap: Option<String>) -> Result<(), EditError> {
        self.row_mut(index)?.flat_cap = cap;
        Ok(())
    }

    fn row(&self, index: usize) -> Result<&TieredAndVolumeRow, EditError> {
        self.data.rows.get(index).ok_or(EditError::NoSuchRow(index))
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut TieredAndVolumeRow, EditError> {
        self.data
            .rows
            .get_mut(index)
            .ok_or(EditError::NoSuchRow(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(first_units: &[u64]) -> TieredAndVolume {
        TieredAndVolume {
            rows: first_units.iter().map(|u| TieredAndVolumeRow::new(*u)).collect(),
            block_size: None,
        }
    }

    fn first_units(table: &TierTable<'_>) -> Vec<u64> {
        table.rows().iter().map(|r| r.first_unit).collect()
    }

    #[test]
    fn test_empty_table_is_seeded() {
        let mut data = TieredAndVolume::default();
        let mut table = TierTable::new(&mut data);
        assert!(table.ensure_seeded());
        assert!(!table.ensure_seeded());
        assert_eq!(first_units(&table), vec![0, 100]);
        assert!(table.rows().iter().all(|r| r.unit_price.is_empty()));
    }

    #[test]
    fn test_add_tier_steps_by_two() {
        let mut data = data(&[0, 100]);
        let mut table = TierTable::new(&mut data);
        assert_eq!(table.add_tier(), Ok(2));
        assert_eq!(first_units(&table), vec![0, 100, 102]);
    }

    #[test]
    fn test_add_tier_past_largest_unit_fails() {
        let mut data = data(&[0, u64::MAX - 1]);
        let mut table = TierTable::new(&mut data);
        assert_eq!(table.add_tier(), Err(EditError::NoRoomAfter(u64::MAX - 1)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_add_tier_on_empty_seeds_defaults() {
        let mut data = TieredAndVolume::default();
        let mut table = TierTable::new(&mut data);
        assert_eq!(table.add_tier(), Ok(1));
        assert_eq!(first_units(&table), vec![0, 100]);
    }

    #[test]
    fn test_removal_rules() {
        let mut data = data(&[0, 100, 200]);
        let mut table = TierTable::new(&mut data);
        assert!(!table.can_remove(0));
        assert!(table.can_remove(2));
        assert_eq!(table.remove_tier(0), Err(EditError::FirstRowLocked));

        let removed = table.remove_tier(1).unwrap();
        assert_eq!(removed.first_unit, 100);
        assert!(!table.can_remove(1));
        assert_eq!(
            table.remove_tier(1),
            Err(EditError::TooFewRows { min: MIN_TIERS })
        );
        assert_eq!(table.remove_tier(7), Err(EditError::NoSuchRow(7)));
    }

    #[test]
    fn test_first_unit_bounds() {
        let mut data = data(&[0, 100, 200]);
        let mut table = TierTable::new(&mut data);

        assert_eq!(table.min_first_unit(0), None);
        assert_eq!(table.min_first_unit(1), Some(2));
        assert_eq!(table.max_first_unit(1), Some(198));
        assert_eq!(table.max_first_unit(2), None);

        assert_eq!(table.set_first_unit(0, 0), Err(EditError::FirstRowLocked));
        assert_eq!(
            table.set_first_unit(1, 1),
            Err(EditError::BelowMinimum { value: 1, min: 2 })
        );
        assert_eq!(
            table.set_first_unit(1, 199),
            Err(EditError::AboveMaximum { value: 199, max: 198 })
        );
        table.set_first_unit(2, 5000).unwrap();
        table.set_first_unit(1, 150).unwrap();
        assert_eq!(first_units(&table), vec![0, 150, 5000]);
    }

    #[test]
    fn test_last_unit_is_derived() {
        let mut data = data(&[0, 100, 250]);
        let mut table = TierTable::new(&mut data);
        assert_eq!(table.last_unit(0), Some(LastUnit::Bounded(99)));
        assert_eq!(table.last_unit(2), Some(LastUnit::Unbounded));
        assert_eq!(table.last_unit(3), None);

        table.set_first_unit(1, 120).unwrap();
        assert_eq!(table.last_unit(0), Some(LastUnit::Bounded(119)));
        assert_eq!(LastUnit::Unbounded.to_string(), "∞");
    }

    #[test]
    fn test_price_setters() {
        let mut data = data(&[0, 100]);
        let mut table = TierTable::new(&mut data);
        table.set_unit_price(1, "0.5").unwrap();
        table.set_flat_fee(1, Some("10".to_string())).unwrap();
        table.set_flat_cap(0, Some("99.99".to_string())).unwrap();
        table.set_block_size(Some(10));
        assert_eq!(table.block_size(), Some(10));
        assert_eq!(table.set_unit_price(2, "1"), Err(EditError::NoSuchRow(2)));
        assert_eq!(data.rows[1].unit_price, "0.5");
        assert_eq!(data.rows[0].flat_cap.as_deref(), Some("99.99"));
    }
}
