//! AWS service taxonomy
//!
//! Canonical service names, their aliases, group remapping, and the
//! blacklist. Built once from a tabular source plus optional override
//! rules; immutable afterwards and safe to share across workers.

use crate::error::{LabelError, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One service in the taxonomy: the authoritative display name plus every
/// string that should resolve to it (the canonical name included).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalService {
    pub canonical_name: String,
    pub aliases: Vec<String>,
}

/// Optional override rules layered on top of the taxonomy table.
///
/// All three lists are independent; a missing rules document means no
/// overrides, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideRules {
    /// Raw group label -> normalized group label.
    #[serde(default)]
    pub group_map: BTreeMap<String, String>,
    /// Substrings that disqualify a canonicalized candidate string.
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// Extra alias -> canonical-name entries. The canonical name may be
    /// new, in which case the service is created on the spot.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl OverrideRules {
    /// Load rules from a JSON document, treating a missing file as empty
    /// rules.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No override rules at {}; using none", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// The full service taxonomy with its derived alias lookup.
#[derive(Debug, Clone)]
pub struct TaxonomyIndex {
    services: HashMap<String, CanonicalService>,
    /// Canonical names in registration order.
    names: Vec<String>,
    /// Lower-cased alias string -> canonical name.
    alias_to_canonical: HashMap<String, String>,
    /// Alias keys in registration order, for deterministic fuzzy scans.
    alias_keys: Vec<String>,
    group_map: HashMap<String, String>,
    blacklist: Vec<String>,
}

impl TaxonomyIndex {
    /// Build the index from CSV text plus optional override rules.
    ///
    /// The canonical-name column is detected among the headers
    /// `canonical|name|service|label` (first column if none match); an
    /// optional pipe-delimited alias column is detected among
    /// `aliases|alias|aka`. Rows with an empty canonical value are
    /// skipped.
    pub fn from_csv_str(csv_text: &str, rules: Option<OverrideRules>) -> Result<Self> {
        Self::from_reader(csv_text.as_bytes(), rules)
    }

    /// Build the index from a CSV file on disk.
    pub fn from_csv_path(path: &Path, rules: Option<OverrideRules>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let index = Self::from_reader(file, rules)?;
        info!(
            "Loaded taxonomy from {}: {} services, {} alias keys",
            path.display(),
            index.names.len(),
            index.alias_keys.len()
        );
        Ok(index)
    }

    fn from_reader<R: Read>(reader: R, rules: Option<OverrideRules>) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let name_idx = headers
            .iter()
            .position(|h| {
                matches!(
                    h.to_lowercase().as_str(),
                    "canonical" | "name" | "service" | "label"
                )
            })
            .unwrap_or(0);
        let alias_idx = headers
            .iter()
            .position(|h| matches!(h.to_lowercase().as_str(), "aliases" | "alias" | "aka"));

        let mut index = Self {
            services: HashMap::new(),
            names: Vec::new(),
            alias_to_canonical: HashMap::new(),
            alias_keys: Vec::new(),
            group_map: HashMap::new(),
            blacklist: Vec::new(),
        };

        for record in rdr.records() {
            let record = record?;
            let canonical = record.get(name_idx).unwrap_or("").trim();
            if canonical.is_empty() || canonical.eq_ignore_ascii_case("nan") {
                continue;
            }

            let mut aliases = vec![canonical.to_string()];
            if let Some(idx) = alias_idx {
                for alias in record.get(idx).unwrap_or("").split('|') {
                    let alias = alias.trim();
                    if !alias.is_empty() && !aliases.iter().any(|a| a == alias) {
                        aliases.push(alias.to_string());
                    }
                }
            }

            for alias in &aliases {
                index.register_alias(alias, canonical);
            }
            index.insert_service(canonical, aliases);
        }

        let rules = rules.unwrap_or_default();
        index.apply_rules(rules);

        if index.names.is_empty() {
            return Err(LabelError::Taxonomy(
                "no canonical services loaded from taxonomy source".to_string(),
            ));
        }
        Ok(index)
    }

    fn apply_rules(&mut self, rules: OverrideRules) {
        for (alias, canonical) in &rules.aliases {
            if let Some(svc) = self.services.get_mut(canonical) {
                if !svc.aliases.iter().any(|a| a == alias) {
                    svc.aliases.push(alias.clone());
                }
            } else {
                self.insert_service(canonical, vec![canonical.clone(), alias.clone()]);
                self.register_alias(canonical, canonical);
            }
            self.register_alias(alias, canonical);
        }

        self.group_map = rules.group_map.into_iter().collect();
        self.blacklist = rules
            .blacklist
            .iter()
            .map(|b| b.trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
    }

    fn insert_service(&mut self, canonical: &str, aliases: Vec<String>) {
        if !self.services.contains_key(canonical) {
            self.names.push(canonical.to_string());
        }
        // Re-listed canonical names merge their alias sets.
        let entry = self
            .services
            .entry(canonical.to_string())
            .or_insert_with(|| CanonicalService {
                canonical_name: canonical.to_string(),
                aliases: Vec::new(),
            });
        for alias in aliases {
            if !entry.aliases.iter().any(|a| *a == alias) {
                entry.aliases.push(alias);
            }
        }
    }

    fn register_alias(&mut self, alias: &str, canonical: &str) {
        let key = alias.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        match self.alias_to_canonical.get(&key) {
            Some(existing) if existing != canonical => {
                warn!(
                    "Alias key '{}' moves from '{}' to '{}' (last writer wins)",
                    key, existing, canonical
                );
            }
            Some(_) => return,
            None => self.alias_keys.push(key.clone()),
        }
        self.alias_to_canonical
            .insert(key, canonical.to_string());
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of canonical services.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All alias strings registered for a canonical name.
    pub fn aliases_of(&self, canonical: &str) -> Option<&[String]> {
        self.services.get(canonical).map(|s| s.aliases.as_slice())
    }

    /// Exact alias-key lookup (case-insensitive).
    pub fn canonical_for(&self, alias: &str) -> Option<&str> {
        self.alias_to_canonical
            .get(&alias.trim().to_lowercase())
            .map(|s| s.as_str())
    }

    /// Lower-cased alias keys in registration order.
    pub(crate) fn alias_keys(&self) -> &[String] {
        &self.alias_keys
    }

    pub(crate) fn canonical_for_key(&self, key: &str) -> Option<&str> {
        self.alias_to_canonical.get(key).map(|s| s.as_str())
    }

    /// Apply the group remap table; unknown groups pass through trimmed.
    pub fn normalize_group(&self, group: &str) -> String {
        let trimmed = group.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        self.group_map
            .get(trimmed)
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// Whether an already-canonicalized key contains a blacklisted
    /// substring.
    pub fn is_blacklisted_key(&self, canon_key: &str) -> bool {
        self.blacklist.iter().any(|b| canon_key.contains(b))
    }
}
