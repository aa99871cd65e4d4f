use crate::assets::Assets;
use crate::debounce::Debouncer;
use crate::filter::{Facet, FilterCriteria, facet_values, filter_indices};
use crate::loader::{self, LoadError, ParsedDataset, Row, Source};
use crate::view::{CardState, CardView, ExpansionState, ProfileLink, ResultsView};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Startup/reload progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Input mode for the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Popup listing the values of one facet.
#[derive(Debug, Clone)]
pub struct FacetPicker {
    pub facet: Facet,
    pub values: Vec<String>,
    pub selected: usize,
}

/// Rows taken up by header, filter bar, borders and status line.
pub const LIST_OVERHEAD: u16 = 9;
/// Typical height of a collapsed card including its separator.
pub const CARD_LINES: u16 = 5;

/// Main application state.
pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub load_state: LoadState,
    pub source: Source,
    pub timeout: Duration,
    pub assets: Assets,
    pending_load: Option<JoinHandle<Result<ParsedDataset, LoadError>>>,

    // Loaded dataset
    pub rows: Vec<Row>,
    pub country_values: Vec<String>,
    pub category_values: Vec<String>,

    // Filtering
    pub criteria: FilterCriteria,
    pub filtered_indices: Vec<usize>,
    pub search_input: String,
    pub search_debounce: Debouncer,
    pub input_mode: InputMode,
    pub picker: Option<FacetPicker>,

    // Cards
    pub expansion: ExpansionState,
    pub selected: usize, // position within filtered_indices
    pub page_size: usize,

    pub status_msg: String,
}

impl App {
    pub fn new(source: Source, timeout: Duration, debounce: Duration, assets: Assets) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            load_state: LoadState::Loading,
            source,
            timeout,
            assets,
            pending_load: None,

            rows: Vec::new(),
            country_values: Vec::new(),
            category_values: Vec::new(),

            criteria: FilterCriteria::default(),
            filtered_indices: Vec::new(),
            search_input: String::new(),
            search_debounce: Debouncer::new(debounce),
            input_mode: InputMode::Normal,
            picker: None,

            expansion: ExpansionState::default(),
            selected: 0,
            page_size: 4,

            status_msg: "Loading directory...".to_string(),
        }
    }

    /// Spawn the fetch if a load is wanted and none is in flight.
    /// The event loop keeps handling keys while it runs.
    pub fn start_load(&mut self) {
        if self.load_state != LoadState::Loading || self.pending_load.is_some() {
            return;
        }
        let source = self.source.clone();
        let timeout = self.timeout;
        self.pending_load = Some(tokio::spawn(async move {
            loader::load(&source, timeout).await
        }));
    }

    /// Install the result of a finished fetch. Returns true if one landed.
    pub async fn poll_load(&mut self) -> bool {
        match self.pending_load.take() {
            Some(handle) if handle.is_finished() => {
                let result = handle.await.unwrap_or_else(|e| Err(LoadError::from(e)));
                self.finish_load(result);
                true
            }
            pending => {
                self.pending_load = pending;
                false
            }
        }
    }

    pub fn is_load_pending(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Abort an in-flight fetch, e.g. on quit.
    pub fn cancel_load(&mut self) {
        if let Some(handle) = self.pending_load.take() {
            tracing::info!("aborting in-flight load of {}", self.source);
            handle.abort();
        }
    }

    pub fn begin_reload(&mut self) {
        self.load_state = LoadState::Loading;
        self.status_msg = format!("Loading directory from {}...", self.source);
    }

    /// Install a fresh dataset, or record the failure without touching state.
    pub fn finish_load(&mut self, result: Result<ParsedDataset, LoadError>) {
        match result {
            Ok(dataset) => {
                self.country_values = facet_values(&dataset.rows, Facet::Country);
                self.category_values = facet_values(&dataset.rows, Facet::Category);
                self.rows = dataset.rows;

                // A reload is a fresh session.
                self.criteria.clear();
                self.search_input.clear();
                self.search_debounce.cancel();
                self.input_mode = InputMode::Normal;
                self.picker = None;
                self.expansion.clear();

                self.load_state = LoadState::Ready;
                self.apply_filter();
                self.status_msg = if dataset.warnings.is_empty() {
                    format!("{} people loaded", self.rows.len())
                } else {
                    format!(
                        "{} people loaded ({} malformed lines skipped)",
                        self.rows.len(),
                        dataset.warnings.len()
                    )
                };
            }
            Err(e) => {
                tracing::error!("failed to load {}: {}", self.source, e);
                self.load_state = LoadState::Failed(e.user_message());
                self.status_msg = "Failed to load data".to_string();
            }
        }
    }

    /// Re-run the filter and reset the selection.
    pub fn apply_filter(&mut self) {
        self.filtered_indices = filter_indices(&self.rows, &self.criteria);
        self.selected = 0;
        tracing::debug!(
            matched = self.filtered_indices.len(),
            countries = self.criteria.selected_countries.len(),
            categories = self.criteria.selected_categories.len(),
            search = %self.criteria.search_text,
            "applied filter"
        );
        self.status_msg = format!(
            "{} of {} people shown",
            self.filtered_indices.len(),
            self.rows.len()
        );
    }

    pub fn results_view(&self) -> ResultsView {
        ResultsView::build(&self.rows, &self.filtered_indices, &self.expansion, &self.assets)
    }

    /// Load position of the highlighted card.
    pub fn selected_row_index(&self) -> Option<usize> {
        self.filtered_indices.get(self.selected).copied()
    }

    fn selected_card(&self) -> Option<CardView> {
        let index = self.selected_row_index()?;
        let row = self.rows.get(index)?;
        Some(CardView::build(index, row, self.expansion.state(index), &self.assets))
    }

    // ── Selection ──

    pub fn update_page_size(&mut self, terminal_height: u16) {
        let cards = terminal_height.saturating_sub(LIST_OVERHEAD) / CARD_LINES;
        self.page_size = (cards as usize).max(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.filtered_indices.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_page_down(&mut self) {
        let last = self.filtered_indices.len().saturating_sub(1);
        self.selected = (self.selected + self.page_size).min(last);
    }

    pub fn select_page_up(&mut self) {
        self.selected = self.selected.saturating_sub(self.page_size);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.filtered_indices.len().saturating_sub(1);
    }

    /// Flip the highlighted card between collapsed and expanded.
    pub fn toggle_expand(&mut self) -> Option<CardState> {
        let index = self.selected_row_index()?;
        Some(self.expansion.toggle(index))
    }

    // ── Search ──

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Editing;
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.search_debounce.trigger(now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        if self.search_input.pop().is_some() {
            self.search_debounce.trigger(now);
        }
    }

    /// Leave the search box and apply what was typed right away.
    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.commit_search();
    }

    fn commit_search(&mut self) {
        self.search_debounce.cancel();
        if self.criteria.search_text != self.search_input {
            self.criteria.search_text = self.search_input.clone();
            self.apply_filter();
        }
    }

    /// Called from the event loop; applies pending search input once quiet.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.search_debounce.poll(now) {
            self.commit_search();
            true
        } else {
            false
        }
    }

    /// Reset every facet and the search box.
    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.search_input.clear();
        self.search_debounce.cancel();
        self.apply_filter();
        self.status_msg = "Filters cleared".to_string();
    }

    // ── Facet pickers ──

    pub fn open_picker(&mut self, facet: Facet) {
        let values = match facet {
            Facet::Country => self.country_values.clone(),
            Facet::Category => self.category_values.clone(),
        };
        if values.is_empty() {
            self.status_msg = format!("No {} values in this dataset", facet.label().to_lowercase());
            return;
        }
        self.picker = Some(FacetPicker {
            facet,
            values,
            selected: 0,
        });
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    pub fn picker_next(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            if picker.selected + 1 < picker.values.len() {
                picker.selected += 1;
            }
        }
    }

    pub fn picker_prev(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            picker.selected = picker.selected.saturating_sub(1);
        }
    }

    /// Toggle the highlighted picker value and re-filter.
    pub fn picker_toggle(&mut self) {
        let Some((facet, value)) = self
            .picker
            .as_ref()
            .and_then(|p| p.values.get(p.selected).map(|v| (p.facet, v.clone())))
        else {
            return;
        };
        self.criteria.toggle(facet, &value);
        self.apply_filter();
    }

    // ── Links ──

    /// Profile URL of the highlighted card, if its control is active.
    pub fn profile_link(&mut self) -> Option<String> {
        let card = self.selected_card()?;
        match card.profile {
            ProfileLink::Active(url) => Some(url),
            ProfileLink::Disabled => {
                self.status_msg = format!("No profile link for {}", card.name);
                None
            }
        }
    }

    /// Company URL of the highlighted card, if it has one.
    pub fn company_link(&mut self) -> Option<String> {
        let card = self.selected_card()?;
        match card.company {
            crate::view::Company::Link { url, .. } => Some(url),
            crate::view::Company::Plain(name) => {
                self.status_msg = format!("No website for {}", name);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ParseWarning;

    fn person(name: &str, country: &str, category: &str) -> Row {
        Row {
            name: name.to_string(),
            country: Some(country.to_string()),
            category: Some(category.to_string()),
            long_description: Some("more".to_string()),
            ..Row::default()
        }
    }

    fn dataset() -> ParsedDataset {
        ParsedDataset {
            rows: vec![
                person("Ada Lovelace", "Singapore", "Founder"),
                person("Grace Hopper", "Vietnam", "Investor"),
                person("Alan Turing", "Vietnam", "Founder"),
            ],
            warnings: Vec::new(),
        }
    }

    fn ready_app() -> App {
        let mut app = App::new(
            Source::File("people.csv".into()),
            Duration::from_secs(1),
            Duration::from_millis(300),
            Assets::default(),
        );
        app.finish_load(Ok(dataset()));
        app
    }

    #[test]
    fn test_finish_load_success() {
        let app = ready_app();
        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.filtered_indices, vec![0, 1, 2]);
        assert_eq!(app.country_values, vec!["Singapore", "Vietnam"]);
        assert_eq!(app.category_values, vec!["Founder", "Investor"]);
        assert_eq!(app.status_msg, "3 people loaded");
    }

    #[test]
    fn test_finish_load_reports_skipped_lines() {
        let mut app = ready_app();
        let mut data = dataset();
        data.warnings.push(ParseWarning {
            line: 4,
            message: "bad".to_string(),
        });
        app.finish_load(Ok(data));
        assert!(app.status_msg.contains("1 malformed lines skipped"));
    }

    #[test]
    fn test_finish_load_failure_keeps_state() {
        let mut app = App::new(
            Source::File("people.csv".into()),
            Duration::from_secs(1),
            Duration::from_millis(300),
            Assets::default(),
        );
        app.finish_load(Err(LoadError::Status {
            status: 503,
            url: "https://example.com".to_string(),
        }));
        match &app.load_state {
            LoadState::Failed(msg) => assert!(msg.contains("503")),
            other => panic!("Expected Failed, got {other:?}"),
        }
        assert!(app.rows.is_empty());
    }

    #[test]
    fn test_expansion_survives_filter_changes() {
        let mut app = ready_app();
        app.select_last();
        assert_eq!(app.toggle_expand(), Some(CardState::Expanded));

        app.open_picker(Facet::Country);
        // Singapore is first
        app.picker_toggle();
        assert_eq!(app.filtered_indices, vec![0]);

        app.clear_filters();
        assert_eq!(app.expansion.state(2), CardState::Expanded);
        assert_eq!(app.expansion.state(0), CardState::Collapsed);
    }

    #[test]
    fn test_reload_discards_session_state() {
        let mut app = ready_app();
        app.toggle_expand();
        app.criteria.toggle(Facet::Category, "Founder");
        app.apply_filter();

        app.finish_load(Ok(dataset()));
        assert_eq!(app.expansion, ExpansionState::default());
        assert!(app.criteria.is_empty());
        assert_eq!(app.filtered_indices.len(), 3);
    }

    #[test]
    fn test_toggle_expand_uses_load_position() {
        let mut app = ready_app();
        app.criteria.toggle(Facet::Country, "Vietnam");
        app.apply_filter();
        assert_eq!(app.filtered_indices, vec![1, 2]);

        app.select_next();
        app.toggle_expand();
        assert_eq!(app.expansion.state(2), CardState::Expanded);
        assert_eq!(app.expansion.state(1), CardState::Collapsed);
    }

    #[test]
    fn test_search_is_debounced() {
        let mut app = ready_app();
        let start = Instant::now();
        app.start_search();
        for (i, c) in "grace".chars().enumerate() {
            app.push_search_char(c, start + Duration::from_millis(i as u64 * 50));
        }
        // typed, but not applied yet
        assert_eq!(app.filtered_indices.len(), 3);
        assert!(!app.tick(start + Duration::from_millis(400)));

        assert!(app.tick(start + Duration::from_millis(500)));
        assert_eq!(app.criteria.search_text, "grace");
        assert_eq!(app.filtered_indices, vec![1]);
        assert!(!app.tick(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_finish_search_applies_immediately() {
        let mut app = ready_app();
        let now = Instant::now();
        app.start_search();
        app.push_search_char('t', now);
        app.push_search_char('u', now);
        app.pop_search_char(now);
        app.push_search_char('u', now);
        app.finish_search();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.filtered_indices, vec![2]);
        assert!(!app.search_debounce.is_pending());
    }

    #[test]
    fn test_clear_filters() {
        let mut app = ready_app();
        app.criteria.toggle(Facet::Country, "Vietnam");
        app.search_input = "zzz".to_string();
        app.finish_search();
        assert!(app.filtered_indices.is_empty());

        app.clear_filters();
        assert!(app.criteria.is_empty());
        assert!(app.search_input.is_empty());
        assert_eq!(app.filtered_indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_picker_navigation_and_toggle() {
        let mut app = ready_app();
        app.open_picker(Facet::Category);
        app.picker_next();
        app.picker_next();
        assert_eq!(app.picker.as_ref().unwrap().selected, 1);
        app.picker_toggle();
        assert!(app.criteria.selected_categories.contains("Investor"));
        assert_eq!(app.filtered_indices, vec![1]);

        app.picker_toggle();
        assert!(app.criteria.selected_categories.is_empty());
        app.picker_prev();
        app.close_picker();
        assert!(app.picker.is_none());
    }

    #[test]
    fn test_open_picker_without_values() {
        let mut app = ready_app();
        app.finish_load(Ok(ParsedDataset::default()));
        app.open_picker(Facet::Country);
        assert!(app.picker.is_none());
    }

    #[test]
    fn test_selection_bounds() {
        let mut app = ready_app();
        app.select_prev();
        assert_eq!(app.selected, 0);
        app.page_size = 2;
        app.select_page_down();
        assert_eq!(app.selected, 2);
        app.select_next();
        assert_eq!(app.selected, 2);
        app.select_page_up();
        assert_eq!(app.selected, 0);
        app.update_page_size(40);
        assert_eq!(app.page_size, 6);
    }

    #[test]
    fn test_links() {
        let mut app = ready_app();
        assert_eq!(app.profile_link(), None);
        assert!(app.status_msg.contains("No profile link"));

        app.rows[0].profile_link = Some("https://linkedin.example/ada".to_string());
        app.rows[0].company_link = Some("https://ada.example".to_string());
        assert_eq!(app.profile_link().as_deref(), Some("https://linkedin.example/ada"));
        assert_eq!(app.company_link().as_deref(), Some("https://ada.example"));
    }

    async fn wait_for_load(app: &mut App) {
        for _ in 0..200 {
            if app.poll_load().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("load did not finish");
    }

    #[tokio::test]
    async fn test_background_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name_plain,country").unwrap();
        writeln!(file, "Ada,Vietnam").unwrap();

        let mut app = App::new(
            Source::File(file.path().to_path_buf()),
            Duration::from_secs(5),
            Duration::from_millis(300),
            Assets::default(),
        );
        app.start_load();
        assert!(app.is_load_pending());
        // a second call while in flight does not spawn another fetch
        app.start_load();

        wait_for_load(&mut app).await;
        assert!(!app.is_load_pending());
        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_background_load_failure_then_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        let mut app = App::new(
            Source::File(path.clone()),
            Duration::from_secs(5),
            Duration::from_millis(300),
            Assets::default(),
        );
        app.start_load();
        wait_for_load(&mut app).await;
        assert!(matches!(app.load_state, LoadState::Failed(_)));

        // nothing is spawned outside the loading state
        app.start_load();
        assert!(!app.is_load_pending());

        std::fs::write(&path, "name_plain\nGrace\n").unwrap();
        app.begin_reload();
        app.start_load();
        wait_for_load(&mut app).await;
        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.rows[0].name, "Grace");
    }

    #[tokio::test]
    async fn test_cancel_load() {
        let mut app = App::new(
            Source::File("people.csv".into()),
            Duration::from_secs(1),
            Duration::from_millis(300),
            Assets::default(),
        );
        app.start_load();
        app.cancel_load();
        assert!(!app.is_load_pending());
        assert!(!app.poll_load().await);
        assert_eq!(app.load_state, LoadState::Loading);
    }

    #[tokio::test]
    async fn test_task_failure_message() {
        let handle = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        handle.abort();
        let err = LoadError::from(handle.await.unwrap_err());
        assert!(err.user_message().starts_with("The load was interrupted"));
    }
}
