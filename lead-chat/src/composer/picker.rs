//! Lead picker: filtering, wrapping selection and candidate loading

use tracing::{debug, warn};

use crate::error::ChatResult;
use crate::models::{CandidateLead, ConversationKey};
use crate::services::LeadDirectory;

/// Case-insensitive substring match over name, business name and id.
///
/// A blank query keeps every candidate. Order is preserved.
pub fn filter<'a>(candidates: &'a [CandidateLead], query: &str) -> Vec<&'a CandidateLead> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.iter().collect();
    }

    candidates
        .iter()
        .filter(|lead| {
            lead.name.to_lowercase().contains(&needle)
                || lead
                    .business_name
                    .as_deref()
                    .is_some_and(|b| b.to_lowercase().contains(&needle))
                || lead.id.to_string().contains(&needle)
        })
        .collect()
}

/// One-shot lookup of the leads shared in a conversation
pub async fn fetch_candidates(
    directory: &dyn LeadDirectory,
    key: &ConversationKey,
) -> ChatResult<Vec<CandidateLead>> {
    let leads = directory.shared_leads(key).await?;
    debug!("Fetched {} candidate leads for {}", leads.len(), key);
    Ok(leads)
}

/// Identifies one candidate load; only the latest ticket is honored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// What the picker should render
#[derive(Debug, PartialEq, Eq)]
pub enum PickerView<'a> {
    Hidden,
    Loading,
    Failed(&'a str),
    NoResults,
    Results {
        items: Vec<&'a CandidateLead>,
        selected: usize,
    },
}

#[derive(Debug)]
pub struct LeadPicker {
    candidates: Vec<CandidateLead>,
    load: LoadState,
    generation: u64,
    open: bool,
    query: String,
    selected: usize,
}

impl Default for LeadPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadPicker {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            load: LoadState::Idle,
            generation: 0,
            open: false,
            query: String::new(),
            selected: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn candidates(&self) -> &[CandidateLead] {
        &self.candidates
    }

    pub fn open(&mut self, query: &str) {
        self.open = true;
        self.query = query.to_string();
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
            self.selected = 0;
        }
    }

    pub fn matches(&self) -> Vec<&CandidateLead> {
        filter(&self.candidates, &self.query)
    }

    pub fn move_down(&mut self) {
        let len = self.matches().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn move_up(&mut self) {
        let len = self.matches().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn selected(&self) -> Option<&CandidateLead> {
        self.matches().get(self.selected).copied()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.load = LoadState::Loading;
        LoadTicket(self.generation)
    }

    /// Apply a load result. Returns false when the ticket was superseded.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: ChatResult<Vec<CandidateLead>>,
    ) -> bool {
        if ticket.0 != self.generation {
            debug!("Discarding stale candidate load");
            return false;
        }
        match result {
            Ok(candidates) => {
                self.candidates = candidates;
                self.load = LoadState::Loaded;
            }
            Err(e) => {
                warn!("Candidate lead load failed: {}", e);
                self.candidates.clear();
                self.load = LoadState::Failed(e.user_message());
            }
        }
        self.selected = 0;
        true
    }

    /// Forget everything tied to the previous conversation
    pub fn reset_for_conversation(&mut self) {
        self.generation += 1;
        self.candidates.clear();
        self.load = LoadState::Idle;
        self.open = false;
        self.query.clear();
        self.selected = 0;
    }

    pub fn view(&self) -> PickerView<'_> {
        if !self.open {
            return PickerView::Hidden;
        }
        match &self.load {
            LoadState::Loading => PickerView::Loading,
            LoadState::Failed(reason) => PickerView::Failed(reason),
            LoadState::Idle | LoadState::Loaded => {
                let items = self.matches();
                if items.is_empty() {
                    PickerView::NoResults
                } else {
                    let selected = self.selected.min(items.len() - 1);
                    PickerView::Results { items, selected }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    fn leads() -> Vec<CandidateLead> {
        vec![
            CandidateLead::new(42, "Acme Co").with_business_name("Acme Holdings"),
            CandidateLead::new(7, "Bolt Ltd"),
            CandidateLead::new(1042, "Crane"),
        ]
    }

    fn loaded_picker() -> LeadPicker {
        let mut picker = LeadPicker::new();
        let ticket = picker.begin_load();
        picker.finish_load(ticket, Ok(leads()));
        picker.open("");
        picker
    }

    #[test]
    fn test_filter_matches_name_business_and_id() {
        let all = leads();
        let ids = |q: &str| filter(&all, q).iter().map(|l| l.id).collect::<Vec<_>>();

        assert_eq!(ids("acme"), vec![42]);
        assert_eq!(ids("HOLDINGS"), vec![42]);
        assert_eq!(ids("42"), vec![42, 1042]);
        assert_eq!(ids("  "), vec![42, 7, 1042]);
        assert!(ids("zzz").is_empty());
    }

    #[test]
    fn test_selection_wraps() {
        let mut picker = loaded_picker();

        picker.move_up();
        assert_eq!(picker.selected_index(), 2);

        for _ in 0..3 {
            picker.move_down();
        }
        assert_eq!(picker.selected_index(), 2);
    }

    #[test]
    fn test_query_change_resets_selection() {
        let mut picker = loaded_picker();
        picker.move_down();
        picker.set_query("c");
        assert_eq!(picker.selected_index(), 0);
        assert_eq!(picker.selected().map(|l| l.id), Some(42));
    }

    #[test]
    fn test_navigation_on_empty_list_is_noop() {
        let mut picker = loaded_picker();
        picker.set_query("nothing matches");
        picker.move_down();
        picker.move_up();
        assert_eq!(picker.selected_index(), 0);
        assert!(picker.selected().is_none());
        assert_eq!(picker.view(), PickerView::NoResults);
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut picker = LeadPicker::new();
        let first = picker.begin_load();
        picker.reset_for_conversation();
        let second = picker.begin_load();

        assert!(!picker.finish_load(first, Ok(leads())));
        assert!(picker.candidates().is_empty());

        picker.open("");
        assert_eq!(picker.view(), PickerView::Loading);

        assert!(picker.finish_load(second, Err(ChatError::Http("timeout".into()))));
        assert!(matches!(picker.view(), PickerView::Failed(_)));
    }

    #[test]
    fn test_hidden_when_closed() {
        let mut picker = loaded_picker();
        picker.close();
        assert_eq!(picker.view(), PickerView::Hidden);
    }
}
