//! Whitelist/blacklist selection of which collections get extracted.
//!
//! Whitelist mode is represented internally as a working blacklist equal to
//! the complement of the user's selections, so both modes share the same
//! `is_album_allowed` test.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Collection names that are smart folders rather than user albums.
pub const NUA_NAMES: [&str; 4] = ["Favorites", "Hidden", "Selfies", "Recently Deleted"];

/// An album or smart folder as a filterable entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub is_nua: bool,
}

impl ListEntry {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        let is_nua = NUA_NAMES.contains(&name.as_str());
        Self { name, is_nua }
    }
}

/// The resolved filter the extraction engine evaluates assets against.
#[derive(Debug, Clone)]
pub struct CollectionFilter {
    pub entries: Vec<ListEntry>,
    pub is_blacklist: bool,
}

impl CollectionFilter {
    /// An empty blacklist: every collection is extracted.
    pub fn allow_all() -> Self {
        Self {
            entries: Vec::new(),
            is_blacklist: true,
        }
    }
}

impl Default for CollectionFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}

/// Mutable policy state owned by the host between extractions.
#[derive(Debug, Clone)]
pub struct CollectionPolicy {
    working_blacklist: HashSet<ListEntry>,
    original_full_list: HashSet<ListEntry>,
    is_blacklist_mode: bool,
}

impl Default for CollectionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionPolicy {
    pub fn new() -> Self {
        Self {
            working_blacklist: HashSet::new(),
            original_full_list: HashSet::new(),
            is_blacklist_mode: true,
        }
    }

    pub fn is_blacklist_mode(&self) -> bool {
        self.is_blacklist_mode
    }

    /// Current mode and the albums selected in it, for display.
    pub fn state(&self) -> (String, String) {
        let mode = if self.is_blacklist_mode {
            "Blacklist"
        } else {
            "Whitelist"
        };

        let mut names: Vec<&str> = if self.is_blacklist_mode {
            self.working_blacklist.iter().map(|e| e.name.as_str()).collect()
        } else {
            // Whitelist view is the complement of the working blacklist
            self.original_full_list
                .difference(&self.working_blacklist)
                .map(|e| e.name.as_str())
                .collect()
        };
        names.sort_unstable();

        let album_string = if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        };

        (mode.to_string(), album_string)
    }

    /// Switch between blacklist and whitelist mode, clearing the selection.
    ///
    /// Whitelist mode needs the full album list to build the complement;
    /// without it the switch is refused and blacklist mode is restored.
    pub fn toggle_mode(&mut self, all_album_names: Option<&[String]>) -> String {
        self.is_blacklist_mode = !self.is_blacklist_mode;
        self.working_blacklist.clear();
        self.original_full_list.clear();

        if !self.is_blacklist_mode {
            let names = match all_album_names {
                Some(names) if !names.is_empty() => names,
                _ => {
                    self.is_blacklist_mode = true;
                    return "[!] Error: Cannot create Whitelist without backup data."
                        .to_string();
                }
            };

            for name in names {
                let entry = ListEntry::new(name);
                self.working_blacklist.insert(entry.clone());
                self.original_full_list.insert(entry);
            }

            return "Mode switched to: Whitelist (List cleared. Select albums to ALLOW.)"
                .to_string();
        }

        "Mode switched to: Blacklist (List cleared. Select albums to BLOCK.)".to_string()
    }

    /// Add or remove an album from the active selection.
    pub fn toggle_album(&mut self, album_name: &str) -> (bool, String) {
        let name = album_name.trim();
        if name.is_empty() {
            return (false, "Album name cannot be empty.".to_string());
        }

        let entry = ListEntry::new(name);

        if self.is_blacklist_mode {
            if self.working_blacklist.remove(&entry) {
                (true, format!("Album '{}' removed from Blacklist.", entry.name))
            } else {
                let message = format!("Album '{}' added to Blacklist.", entry.name);
                self.working_blacklist.insert(entry);
                (true, message)
            }
        } else {
            // Inverted: removing from the working blacklist adds the album
            // to the whitelist, and vice versa.
            if self.working_blacklist.remove(&entry) {
                (true, format!("Album '{}' added to Whitelist.", entry.name))
            } else {
                let message = format!("Album '{}' removed from Whitelist.", entry.name);
                self.working_blacklist.insert(entry);
                (true, message)
            }
        }
    }

    /// An album is eligible for export iff it is absent from the working
    /// blacklist, in both modes.
    pub fn is_album_allowed(&self, album_name: &str) -> bool {
        !self.working_blacklist.contains(&ListEntry::new(album_name))
    }

    /// Resolve the filter the extraction engine consumes. In whitelist mode
    /// the entries are the user's selections (the complement of the working
    /// blacklist).
    pub fn to_filter(&self) -> CollectionFilter {
        let mut entries: Vec<ListEntry> = if self.is_blacklist_mode {
            self.working_blacklist.iter().cloned().collect()
        } else {
            self.original_full_list
                .difference(&self.working_blacklist)
                .cloned()
                .collect()
        };
        entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));

        CollectionFilter {
            entries,
            is_blacklist: self.is_blacklist_mode,
        }
    }
}
