use crate::color::ColorMap;
use crate::data::matcher::{self, MatchPolicy};
use crate::data::model::ObservationTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded observation table (None until user loads a file).
    pub dataset: Option<ObservationTable>,

    /// Base pair picked in the selector.
    pub selected_pair: Option<String>,

    /// Raw hydrogen-bond query text, comma separated.
    pub hbond_input: String,

    /// Use the historical substring matching instead of exact atom pairs.
    pub legacy_substring: bool,

    /// Result of the last successful search.
    pub results: Option<ObservationTable>,

    /// Colour per distinct base-pair label of the loaded table.
    pub pair_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            selected_pair: None,
            hbond_input: String::new(),
            legacy_substring: false,
            results: None,
            pair_colors: None,
            status_message: None,
            loading: false,
        }
    }
}

/// Split the query box into individual hydrogen-bond terms: comma
/// separated, whitespace trimmed, empty pieces dropped.
pub fn parse_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppState {
    /// Ingest a newly loaded table, preselect a pair and build colours.
    pub fn set_dataset(&mut self, table: ObservationTable) {
        self.selected_pair = table.base_pairs.iter().next().cloned();
        self.pair_colors = Some(ColorMap::new(&table.base_pairs));

        // Results belong to the previous table.
        self.results = None;

        self.dataset = Some(table);
        self.status_message = None;
        self.loading = false;
    }

    /// The matching policy selected in the UI.
    pub fn policy(&self) -> MatchPolicy {
        if self.legacy_substring {
            MatchPolicy::Substring
        } else {
            MatchPolicy::Exact
        }
    }

    /// Run the search over the loaded table with the current inputs.
    pub fn run_search(&mut self) {
        let policy = self.policy();
        let Some(table) = &self.dataset else {
            self.status_message = Some("Load a dataset first.".to_string());
            return;
        };
        let Some(pair) = &self.selected_pair else {
            self.status_message = Some("Select a base pair.".to_string());
            return;
        };
        let terms = parse_terms(&self.hbond_input);
        if terms.is_empty() {
            self.status_message = Some("Enter at least one hydrogen bond.".to_string());
            return;
        }

        match matcher::find_interest(table, pair, &terms, policy) {
            Ok(results) => {
                log::info!(
                    "Search for {pair} with {} term(s) matched {} of {} observations",
                    terms.len(),
                    results.len(),
                    table.len()
                );
                self.status_message = None;
                self.results = Some(results);
            }
            Err(err) => {
                log::warn!("Rejected query: {err}");
                self.status_message = Some(err.to_string());
                self.results = None;
            }
        }
    }
}
