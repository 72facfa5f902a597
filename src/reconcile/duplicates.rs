//! Duplicate detection for serial numbers and tag ids within one site.
//!
//! Duplicates are surfaced, never prevented: legacy imports already contain
//! shared serials and tags, and operators fix them over time. For each
//! identifier field the index keeps how often every normalized value occurs
//! and which record is the canonical "winner" for it (most recently
//! modified).

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{InventoryRecord, Provenance, RecordFields, SiteId};

use super::draft::Draft;
use super::normalize::optional_value_key;

/// Identifier fields checked for duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateField {
    SerialNumber,
    TagId,
}

impl DuplicateField {
    pub const ALL: [DuplicateField; 2] = [DuplicateField::SerialNumber, DuplicateField::TagId];

    pub fn label(&self) -> &'static str {
        match self {
            DuplicateField::SerialNumber => "Serial number",
            DuplicateField::TagId => "Tag id",
        }
    }

    pub fn value<'a>(&self, fields: &'a RecordFields) -> Option<&'a str> {
        match self {
            DuplicateField::SerialNumber => fields.serial_number.as_deref(),
            DuplicateField::TagId => fields.tag_id.as_deref(),
        }
    }
}

/// Canonical record among all records sharing one identifier value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Winner {
    pub id: Uuid,
    pub modified_at: DateTime<Utc>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldIndex {
    frequency: BTreeMap<String, usize>,
    winners: BTreeMap<String, Winner>,
}

impl FieldIndex {
    fn record(&mut self, key: String, record: &InventoryRecord) {
        *self.frequency.entry(key.clone()).or_insert(0) += 1;

        let candidate = Winner {
            id: record.id,
            modified_at: record.modified_at,
            provenance: record.provenance,
        };
        match self.winners.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            // ties keep the first record seen
            Entry::Occupied(mut slot) => {
                if candidate.modified_at > slot.get().modified_at {
                    slot.insert(candidate);
                }
            }
        }
    }
}

/// Per-field duplicate highlighting for one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DuplicateFlags {
    pub serial_number: bool,
    pub tag_id: bool,
}

impl DuplicateFlags {
    pub fn any(&self) -> bool {
        self.serial_number || self.tag_id
    }

    fn set(&mut self, field: DuplicateField) {
        match field {
            DuplicateField::SerialNumber => self.serial_number = true,
            DuplicateField::TagId => self.tag_id = true,
        }
    }
}

/// One field of a draft colliding with another record's value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldConflict {
    pub field: DuplicateField,
    /// Value as entered, trimmed
    pub value: String,
    pub conflicting_id: Uuid,
    pub conflicting_provenance: Provenance,
    /// How many records in the set currently carry this value
    pub occurrences: usize,
    pub message: String,
}

/// Advisory outcome of a duplicate check. Never blocks a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConflictReport {
    pub conflicts: Vec<FieldConflict>,
}

impl ConflictReport {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn has(&self, field: DuplicateField) -> bool {
        self.conflicts.iter().any(|c| c.field == field)
    }

    pub fn flags(&self) -> DuplicateFlags {
        let mut flags = DuplicateFlags::default();
        for conflict in &self.conflicts {
            flags.set(conflict.field);
        }
        flags
    }

    pub fn summary(&self) -> String {
        self.conflicts
            .iter()
            .map(|c| c.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Frequency and winner maps for one site's record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIndex {
    site: SiteId,
    serial: FieldIndex,
    tag: FieldIndex,
}

impl DuplicateIndex {
    pub fn empty(site: SiteId) -> Self {
        Self {
            site,
            serial: FieldIndex::default(),
            tag: FieldIndex::default(),
        }
    }

    /// Build from the full record set of `site`.
    ///
    /// Records are expected most-recent-first; winners are chosen by
    /// modification time either way, with ties going to the earlier record.
    /// Records belonging to other sites are skipped.
    pub fn build<'a, I>(site: SiteId, records: I) -> Self
    where
        I: IntoIterator<Item = &'a InventoryRecord>,
    {
        let mut index = Self::empty(site);
        let mut skipped = 0usize;

        for record in records {
            if record.site_id != index.site {
                skipped += 1;
                continue;
            }
            if let Some(key) = optional_value_key(record.fields.serial_number.as_deref()) {
                index.serial.record(key, record);
            }
            if let Some(key) = optional_value_key(record.fields.tag_id.as_deref()) {
                index.tag.record(key, record);
            }
        }

        if skipped > 0 {
            tracing::warn!(
                "Skipped {} records from other sites while indexing {}",
                skipped,
                index.site
            );
        }
        tracing::debug!(
            site = %index.site,
            serials = index.serial.frequency.len(),
            tags = index.tag.frequency.len(),
            "Duplicate index built"
        );

        index
    }

    pub fn site(&self) -> &SiteId {
        &self.site
    }

    fn field(&self, field: DuplicateField) -> &FieldIndex {
        match field {
            DuplicateField::SerialNumber => &self.serial,
            DuplicateField::TagId => &self.tag,
        }
    }

    /// Occurrence count of every normalized value of `field`
    pub fn frequencies(&self, field: DuplicateField) -> &BTreeMap<String, usize> {
        &self.field(field).frequency
    }

    /// Normalized values of `field` that occur more than once
    pub fn duplicated_values(&self, field: DuplicateField) -> BTreeMap<String, usize> {
        self.frequencies(field)
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(value, count)| (value.clone(), *count))
            .collect()
    }

    /// Winner id of every normalized value of `field`
    pub fn winner_ids(&self, field: DuplicateField) -> BTreeMap<String, Uuid> {
        self.field(field)
            .winners
            .iter()
            .map(|(value, winner)| (value.clone(), winner.id))
            .collect()
    }

    pub fn occurrences(&self, field: DuplicateField, raw: &str) -> usize {
        optional_value_key(Some(raw))
            .and_then(|key| self.field(field).frequency.get(&key).copied())
            .unwrap_or(0)
    }

    pub fn winner(&self, field: DuplicateField, raw: &str) -> Option<&Winner> {
        let key = optional_value_key(Some(raw))?;
        self.field(field).winners.get(&key)
    }

    /// Which identifier fields of `fields` still appear more than once in the set
    pub fn flags_for(&self, fields: &RecordFields) -> DuplicateFlags {
        let mut flags = DuplicateFlags::default();
        for field in DuplicateField::ALL {
            if let Some(value) = field.value(fields) {
                if self.occurrences(field, value) > 1 {
                    flags.set(field);
                }
            }
        }
        flags
    }

    /// Check a draft's serial number and tag id against the winners.
    ///
    /// An edit whose serial and tag are unchanged from the pre-edit snapshot
    /// is never reported, even when other records share those values. A
    /// field conflicts when its value has a winner other than the draft's
    /// own record; a new draft conflicts with any winner.
    pub fn check_conflict(&self, draft: &Draft) -> ConflictReport {
        let fields = draft.fields();
        let serial = optional_value_key(fields.serial_number.as_deref());
        let tag = optional_value_key(fields.tag_id.as_deref());

        if serial.is_none() && tag.is_none() {
            return ConflictReport::none();
        }

        if let Some(original) = draft.original() {
            let original_serial = optional_value_key(original.fields.serial_number.as_deref());
            let original_tag = optional_value_key(original.fields.tag_id.as_deref());
            if serial == original_serial && tag == original_tag {
                return ConflictReport::none();
            }
        }

        let own_id = draft.record_id();
        let mut report = ConflictReport::none();

        for (field, key) in [(DuplicateField::SerialNumber, serial), (DuplicateField::TagId, tag)] {
            let Some(key) = key else { continue };
            let index = self.field(field);
            let Some(winner) = index.winners.get(&key) else {
                continue;
            };
            if Some(winner.id) == own_id {
                continue;
            }

            let value = field.value(fields).unwrap_or_default().trim().to_string();
            let occurrences = index.frequency.get(&key).copied().unwrap_or(0);
            let message = format!(
                "{} '{}' is already recorded on {} ({})",
                field.label(),
                value,
                short_id(&winner.id),
                winner.provenance
            );
            report.conflicts.push(FieldConflict {
                field,
                value,
                conflicting_id: winner.id,
                conflicting_provenance: winner.provenance,
                occurrences,
                message,
            });
        }

        report
    }
}

/// First eight hex digits of a record id, for operator-facing messages
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn site() -> SiteId {
        SiteId::parse("W100").unwrap()
    }

    fn record(n: u128, serial: Option<&str>, tag: Option<&str>, day: u32) -> InventoryRecord {
        InventoryRecord {
            id: Uuid::from_u128(n),
            site_id: site(),
            fields: RecordFields {
                category: "Enclosure-Active".into(),
                equipment_type: "Cabinet".into(),
                product_name: "ModelX".into(),
                product_number: "PN-1".into(),
                serial_number: serial.map(String::from),
                tag_id: tag.map(String::from),
                ..Default::default()
            },
            provenance: Provenance::OriginalImport,
            modified_at: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
        }
    }

    fn scenario() -> Vec<InventoryRecord> {
        // most-recent-first
        vec![
            record(0xb, Some("SN1"), None, 5),
            record(0xa, Some("SN1"), None, 1),
        ]
    }

    #[test]
    fn test_frequency_and_winner_maps() {
        let index = DuplicateIndex::build(site(), &scenario());
        let freq = index.frequencies(DuplicateField::SerialNumber);
        assert_eq!(freq.len(), 1);
        assert_eq!(freq.get("sn1"), Some(&2));
        assert_eq!(
            index.winner_ids(DuplicateField::SerialNumber).get("sn1"),
            Some(&Uuid::from_u128(0xb))
        );
    }

    #[test]
    fn test_winner_by_recency_regardless_of_order() {
        let mut records = scenario();
        records.reverse();
        let index = DuplicateIndex::build(site(), &records);
        assert_eq!(
            index.winner(DuplicateField::SerialNumber, " sn1 ").map(|w| w.id),
            Some(Uuid::from_u128(0xb))
        );
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let records = vec![
            record(0x2, None, Some("T-9"), 3),
            record(0x1, None, Some("t-9"), 3),
        ];
        let index = DuplicateIndex::build(site(), &records);
        assert_eq!(
            index.winner(DuplicateField::TagId, "T-9").map(|w| w.id),
            Some(Uuid::from_u128(0x2))
        );
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let records = scenario();
        let first = DuplicateIndex::build(site(), &records);
        let second = DuplicateIndex::build(site(), &records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unchanged_edit_skips_check() {
        let records = scenario();
        let index = DuplicateIndex::build(site(), &records);
        let draft = Draft::editing(&records[1]);
        assert!(index.check_conflict(&draft).is_empty());
    }

    #[test]
    fn test_newly_set_serial_conflicts_with_winner() {
        let mut records = scenario();
        records[1].fields.serial_number = None;
        let index = DuplicateIndex::build(site(), &records);

        let mut draft = Draft::editing(&records[1]);
        draft.fields_mut().serial_number = Some("SN1".into());
        let report = index.check_conflict(&draft);

        assert!(report.has(DuplicateField::SerialNumber));
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.conflicting_id, Uuid::from_u128(0xb));
        assert!(conflict.message.contains(&short_id(&Uuid::from_u128(0xb))));
        assert!(conflict.message.contains("original_import"));
    }

    #[test]
    fn test_loser_editing_reports_conflict_winner_does_not() {
        let records = scenario();
        let index = DuplicateIndex::build(site(), &records);

        let mut loser = Draft::editing(&records[1]);
        loser.fields_mut().tag_id = Some("NEW-TAG".into());
        assert!(index.check_conflict(&loser).has(DuplicateField::SerialNumber));

        let mut winner = Draft::editing(&records[0]);
        winner.fields_mut().tag_id = Some("NEW-TAG".into());
        assert!(index.check_conflict(&winner).is_empty());
    }

    #[test]
    fn test_case_only_change_is_unchanged() {
        let records = scenario();
        let index = DuplicateIndex::build(site(), &records);
        let mut draft = Draft::editing(&records[1]);
        draft.fields_mut().serial_number = Some(" sn1".into());
        assert!(index.check_conflict(&draft).is_empty());
    }

    #[test]
    fn test_new_draft_conflicts_with_any_winner() {
        let index = DuplicateIndex::build(site(), &scenario());
        let mut draft = Draft::new_record(site(), None);
        assert!(index.check_conflict(&draft).is_empty());

        draft.fields_mut().serial_number = Some("SN1".into());
        draft.fields_mut().tag_id = Some("FRESH".into());
        let report = index.check_conflict(&draft);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].occurrences, 2);
        assert!(report.flags().serial_number);
        assert!(!report.flags().tag_id);
    }

    #[test]
    fn test_flags_and_duplicated_values() {
        let mut records = scenario();
        records.push(record(0xc, Some("SN2"), Some("T1"), 1));
        let index = DuplicateIndex::build(site(), &records);

        assert!(index.flags_for(&records[0].fields).serial_number);
        assert!(!index.flags_for(&records[2].fields).any());

        let dups = index.duplicated_values(DuplicateField::SerialNumber);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups.get("sn1"), Some(&2));
        assert!(index.duplicated_values(DuplicateField::TagId).is_empty());
    }

    #[test]
    fn test_other_site_records_skipped() {
        let mut foreign = record(0xf, Some("SN1"), None, 9);
        foreign.site_id = SiteId::parse("W999").unwrap();
        let mut records = scenario();
        records.insert(0, foreign);
        let index = DuplicateIndex::build(site(), &records);
        assert_eq!(index.occurrences(DuplicateField::SerialNumber, "SN1"), 2);
    }

    #[test]
    fn test_short_id() {
        let id = Uuid::parse_str("1a2b3c4d-0000-0000-0000-000000000000").unwrap();
        assert_eq!(short_id(&id), "1a2b3c4d");
    }
}
