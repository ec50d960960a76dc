use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellDefinition {
    pub total_liquid_volume: f64,
    pub depth: f64,
}

/// Geometry and capacity of one labware type
///
/// `ordering` lists the well names column by column, front-to-back within a
/// column, which is also the order tips are consumed from a tip rack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDefinition {
    pub uri: String,
    pub is_tiprack: bool,
    #[serde(default)]
    pub tip_volume: Option<f64>,
    #[serde(default)]
    pub tip_length: Option<f64>,
    pub ordering: Vec<Vec<String>>,
    pub wells: BTreeMap<String, WellDefinition>,
}

impl LabwareDefinition {
    pub fn has_well(&self, well: &str) -> bool {
        self.wells.contains_key(well)
    }

    pub fn well(&self, well: &str) -> Option<&WellDefinition> {
        self.wells.get(well)
    }

    /// All well names in column-major order
    pub fn ordered_wells(&self) -> impl Iterator<Item = &String> {
        self.ordering.iter().flatten()
    }

    fn position(&self, well: &str) -> Option<(usize, usize)> {
        self.ordering.iter().enumerate().find_map(|(col, wells)| {
            wells
                .iter()
                .position(|w| w == well)
                .map(|row| (col, row))
        })
    }

    /// Wells reached by each channel of a pipette whose first channel is at `well`
    ///
    /// Index `i` of the result is the well under channel `i`. Labware with a
    /// single well per column (reservoirs, troughs) put every channel into
    /// that well. Returns `None` when the pipette cannot be positioned there,
    /// e.g. an 8-channel aimed at row B of a 96-well plate.
    pub fn wells_for_tips(&self, well: &str, channels: u32) -> Option<Vec<String>> {
        let (col, row) = self.position(well)?;
        match channels {
            1 => Some(vec![well.to_string()]),
            8 => {
                let column = &self.ordering[col];
                if column.len() == 1 {
                    return Some(vec![column[0].clone(); 8]);
                }
                if column.len() % 8 != 0 {
                    return None;
                }
                let step = column.len() / 8;
                if row >= step {
                    return None;
                }
                Some((0..8).map(|i| column[row + step * i].clone()).collect())
            }
            96 => {
                let cols = self.ordering.len();
                let rows = self.ordering[0].len();
                if cols == 1 && rows == 1 {
                    return Some(vec![well.to_string(); 96]);
                }
                if cols % 12 != 0 || rows % 8 != 0 {
                    return None;
                }
                let (col_step, row_step) = (cols / 12, rows / 8);
                if col >= col_step || row >= row_step {
                    return None;
                }
                let mut wells = Vec::with_capacity(96);
                for c in 0..12 {
                    let column = self.ordering.get(col + c * col_step)?;
                    for r in 0..8 {
                        wells.push(column.get(row + r * row_step)?.clone());
                    }
                }
                Some(wells)
            }
            _ => None,
        }
    }
}

/// A labware instance registered in the invariant context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareEntity {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub def_uri: String,
    pub definition: LabwareDefinition,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cols: usize, rows: usize) -> LabwareDefinition {
        let row_names: Vec<char> = ('A'..='Z').take(rows).collect();
        let ordering: Vec<Vec<String>> = (1..=cols)
            .map(|c| row_names.iter().map(|r| format!("{}{}", r, c)).collect())
            .collect();
        let wells = ordering
            .iter()
            .flatten()
            .map(|w| {
                (
                    w.clone(),
                    WellDefinition {
                        total_liquid_volume: 200.0,
                        depth: 10.0,
                    },
                )
            })
            .collect();
        LabwareDefinition {
            uri: format!("test/grid_{}x{}/1", cols, rows),
            is_tiprack: false,
            tip_volume: None,
            tip_length: None,
            ordering,
            wells,
        }
    }

    #[test]
    fn test_eight_channel_reaches_column() {
        let plate = grid(12, 8);
        let wells = plate.wells_for_tips("A3", 8).unwrap();
        assert_eq!(wells.first().map(String::as_str), Some("A3"));
        assert_eq!(wells.last().map(String::as_str), Some("H3"));
        assert!(plate.wells_for_tips("B3", 8).is_none());
    }

    #[test]
    fn test_eight_channel_interleaves_384() {
        let plate = grid(24, 16);
        let wells = plate.wells_for_tips("B1", 8).unwrap();
        assert_eq!(wells[0], "B1");
        assert_eq!(wells[1], "D1");
        assert_eq!(wells[7], "P1");
    }

    #[test]
    fn test_reservoir_shares_single_well() {
        let trough = grid(12, 1);
        assert_eq!(trough.wells_for_tips("A5", 8).unwrap(), vec!["A5".to_string(); 8]);
        let single = grid(1, 1);
        assert_eq!(single.wells_for_tips("A1", 96).unwrap().len(), 96);
    }

    #[test]
    fn test_ninety_six_channel_covers_plate() {
        let plate = grid(12, 8);
        let wells = plate.wells_for_tips("A1", 96).unwrap();
        assert_eq!(wells.len(), 96);
        assert_eq!(wells[8], "A2");
        assert!(plate.wells_for_tips("A2", 96).is_none());
    }

    #[test]
    fn test_unknown_well() {
        assert!(grid(12, 8).wells_for_tips("Z99", 1).is_none());
    }
}
