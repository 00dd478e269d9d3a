use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the observation table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes of a Pandas-exported
/// table. `Display` is the one canonical textual form, used wherever a value
/// leaves the table: descriptor synthesis, the results grid, CSV export.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the table
// ---------------------------------------------------------------------------

/// Name of the one column every observation table must carry.
pub const BASE_PAIR_COLUMN: &str = "base_pair";

/// A single base-pair observation (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// The `"X-Y"` pair label this row was recorded under, as stored.
    pub base_pair: String,
    /// Every other column: column_name → value.
    pub cells: BTreeMap<String, CellValue>,
}

impl Observation {
    /// Cell lookup that reads null (and absent) cells as missing.
    pub fn present_cell(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column).filter(|v| !v.is_null())
    }

    /// Text of any column for display/export; handles `base_pair` too.
    pub fn column_text(&self, column: &str) -> String {
        if column == BASE_PAIR_COLUMN {
            self.base_pair.clone()
        } else {
            self.cells
                .get(column)
                .map(|v| v.to_string())
                .unwrap_or_default()
        }
    }
}

// ---------------------------------------------------------------------------
// Hydrogen-bond slot schema
// ---------------------------------------------------------------------------

/// Highest hydrogen-bond slot index a table can carry.
pub const MAX_HBOND_SLOTS: usize = 10;

/// One usable hydrogen-bond slot: the column pair found under a shared
/// `hbond_<i>` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    /// Lexicographically-first column of the pair, holding the atom text.
    pub atom_column: String,
    /// The other column, holding the bond distance.
    pub distance_column: String,
}

/// Resolve the `hbond_<i>` column-naming convention into an explicit slot
/// list, once, at load time.
///
/// A column claims slot `i` when its name is exactly `hbond_<i>` or ends
/// with `_hbond_<i>`. A slot is usable only when exactly two columns claim
/// it; zero, one, or three-plus claimants skip the slot silently.
pub fn discover_slots(columns: &[String]) -> Vec<Slot> {
    let mut slots = Vec::new();
    for index in 1..=MAX_HBOND_SLOTS {
        let suffix = format!("hbond_{index}");
        let tail = format!("_{suffix}");
        let mut claimants: Vec<&String> = columns
            .iter()
            .filter(|c| **c == suffix || c.ends_with(&tail))
            .collect();
        if claimants.len() != 2 {
            continue;
        }
        claimants.sort();
        slots.push(Slot {
            index,
            atom_column: claimants[0].clone(),
            distance_column: claimants[1].clone(),
        });
    }
    slots
}

// ---------------------------------------------------------------------------
// ObservationTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed lookups.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    /// All observations (rows), in source order.
    pub observations: Vec<Observation>,
    /// Column names in source order, `base_pair` at its source position.
    pub columns: Vec<String>,
    /// Sorted distinct `base_pair` labels, for the selector.
    pub base_pairs: BTreeSet<String>,
    /// Usable hydrogen-bond slots discovered from the column names.
    pub slots: Vec<Slot>,
}

impl ObservationTable {
    /// Build the derived lookups from the loaded rows.
    pub fn new(columns: Vec<String>, observations: Vec<Observation>) -> Self {
        let base_pairs: BTreeSet<String> = observations
            .iter()
            .map(|o| o.base_pair.clone())
            .collect();
        let slots = discover_slots(&columns);
        ObservationTable {
            observations,
            columns,
            base_pairs,
            slots,
        }
    }

    /// Clone the rows at `indices` into a new table, preserving their order
    /// and re-deriving the lookups. The slot schema depends only on the
    /// column names, so it carries over unchanged.
    pub fn subset(&self, indices: &[usize]) -> ObservationTable {
        let rows = indices
            .iter()
            .map(|&i| self.observations[i].clone())
            .collect();
        ObservationTable::new(self.columns.clone(), rows)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn discovers_paired_columns_with_atom_first() {
        let slots = discover_slots(&cols(&[
            "base_pair",
            "atoms_hbond_1",
            "dist_hbond_1",
            "dist_hbond_2",
            "atoms_hbond_2",
        ]));
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].index, 1);
        assert_eq!(slots[0].atom_column, "atoms_hbond_1");
        assert_eq!(slots[0].distance_column, "dist_hbond_1");
        assert_eq!(slots[1].atom_column, "atoms_hbond_2");
        assert_eq!(slots[1].distance_column, "dist_hbond_2");
    }

    #[test]
    fn bare_suffix_name_counts_as_claimant() {
        let slots = discover_slots(&cols(&["hbond_1", "dist_hbond_1"]));
        assert_eq!(slots.len(), 1);
        // "dist_hbond_1" sorts after "hbond_1"
        assert_eq!(slots[0].atom_column, "dist_hbond_1");
        assert_eq!(slots[0].distance_column, "hbond_1");
    }

    #[test]
    fn lone_claimant_skips_the_slot() {
        let slots = discover_slots(&cols(&["base_pair", "atoms_hbond_2"]));
        assert!(slots.is_empty());
    }

    #[test]
    fn three_claimants_skip_the_slot() {
        let slots = discover_slots(&cols(&[
            "atoms_hbond_1",
            "dist_hbond_1",
            "combined_hbond_1",
        ]));
        assert!(slots.is_empty());
    }

    #[test]
    fn suffix_must_sit_on_an_underscore_boundary() {
        // "xhbond_1" does not carry the suffix; "a_hbond_11" is slot 11,
        // which is past MAX_HBOND_SLOTS and not a near-miss for slot 1.
        let slots = discover_slots(&cols(&[
            "xhbond_1",
            "dist_hbond_1",
            "a_hbond_11",
            "d_hbond_11",
        ]));
        assert!(slots.is_empty());
    }

    #[test]
    fn table_derives_sorted_distinct_pairs() {
        let rows = vec![
            Observation {
                base_pair: "U-G".to_string(),
                cells: BTreeMap::new(),
            },
            Observation {
                base_pair: "G-C".to_string(),
                cells: BTreeMap::new(),
            },
            Observation {
                base_pair: "U-G".to_string(),
                cells: BTreeMap::new(),
            },
        ];
        let table = ObservationTable::new(cols(&["base_pair"]), rows);
        let pairs: Vec<&String> = table.base_pairs.iter().collect();
        assert_eq!(pairs, vec!["G-C", "U-G"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn subset_keeps_columns_and_row_order() {
        let rows = vec![
            Observation {
                base_pair: "G-C".to_string(),
                cells: BTreeMap::new(),
            },
            Observation {
                base_pair: "A-U".to_string(),
                cells: BTreeMap::new(),
            },
            Observation {
                base_pair: "G-U".to_string(),
                cells: BTreeMap::new(),
            },
        ];
        let table = ObservationTable::new(cols(&["base_pair", "resolution"]), rows);
        let sub = table.subset(&[0, 2]);
        assert_eq!(sub.columns, table.columns);
        assert_eq!(sub.observations[0].base_pair, "G-C");
        assert_eq!(sub.observations[1].base_pair, "G-U");
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn null_cells_read_as_missing() {
        let mut cells = BTreeMap::new();
        cells.insert("dist_hbond_1".to_string(), CellValue::Null);
        cells.insert(
            "atoms_hbond_1".to_string(),
            CellValue::String("O6-N3".to_string()),
        );
        let obs = Observation {
            base_pair: "G-U".to_string(),
            cells,
        };
        assert!(obs.present_cell("dist_hbond_1").is_none());
        assert!(obs.present_cell("atoms_hbond_1").is_some());
        assert!(obs.present_cell("no_such_column").is_none());
        assert_eq!(obs.column_text("dist_hbond_1"), "");
        assert_eq!(obs.column_text("base_pair"), "G-U");
    }
}
