//! Cascading catalog index.
//!
//! Built once from the flat catalog and queried for the legal values of the
//! next field in the category → equipment type → product name → product
//! number chain. Unknown or missing parent keys yield an empty list.

use std::collections::{BTreeSet, HashMap};

use crate::models::{CatalogEntry, RecordFields};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    categories: BTreeSet<String>,
    equipment_types: HashMap<String, BTreeSet<String>>,
    product_names: HashMap<(String, String), BTreeSet<String>>,
    product_numbers: HashMap<(String, String, String), BTreeSet<String>>,
}

impl CatalogIndex {
    /// An index with no entries. Answers every query with an empty list and
    /// never flags a selection.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a CatalogEntry>,
    {
        let mut index = Self::default();

        for entry in entries {
            let category = entry.category.trim();
            if category.is_empty() {
                continue;
            }
            index.categories.insert(category.to_string());

            let equipment_type = entry.equipment_type.trim();
            if equipment_type.is_empty() {
                continue;
            }
            index
                .equipment_types
                .entry(category.to_string())
                .or_default()
                .insert(equipment_type.to_string());

            let product_name = entry.product_name.trim();
            if product_name.is_empty() {
                continue;
            }
            index
                .product_names
                .entry((category.to_string(), equipment_type.to_string()))
                .or_default()
                .insert(product_name.to_string());

            let product_number = entry.product_number.trim();
            if product_number.is_empty() {
                continue;
            }
            index
                .product_numbers
                .entry((
                    category.to_string(),
                    equipment_type.to_string(),
                    product_name.to_string(),
                ))
                .or_default()
                .insert(product_number.to_string());
        }

        tracing::debug!(
            categories = index.categories.len(),
            product_numbers = index.product_numbers.values().map(BTreeSet::len).sum::<usize>(),
            "Catalog index built"
        );

        index
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        self.categories.iter().cloned().collect()
    }

    pub fn equipment_types_for(&self, category: &str) -> Vec<String> {
        collect(self.equipment_types.get(category.trim()))
    }

    pub fn product_names_for(&self, category: &str, equipment_type: &str) -> Vec<String> {
        let key = (category.trim().to_string(), equipment_type.trim().to_string());
        collect(self.product_names.get(&key))
    }

    pub fn product_numbers_for(
        &self,
        category: &str,
        equipment_type: &str,
        product_name: &str,
    ) -> Vec<String> {
        let key = (
            category.trim().to_string(),
            equipment_type.trim().to_string(),
            product_name.trim().to_string(),
        );
        collect(self.product_numbers.get(&key))
    }

    /// Advisory note when the selected chain is not in a loaded catalog.
    ///
    /// Reports the first link of the chain that the catalog does not know.
    /// Empty downstream fields are left to commit validation.
    pub fn check_selection(&self, fields: &RecordFields) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let category = fields.category.trim();
        let equipment_type = fields.equipment_type.trim();
        let product_name = fields.product_name.trim();
        let product_number = fields.product_number.trim();

        if category.is_empty() {
            return None;
        }
        if !self.categories.contains(category) {
            return Some(format!("Category '{}' is not in the catalog", category));
        }

        if equipment_type.is_empty() {
            return None;
        }
        if !contains(self.equipment_types.get(category), equipment_type) {
            return Some(format!(
                "Equipment type '{}' is not listed for category '{}'",
                equipment_type, category
            ));
        }

        if product_name.is_empty() {
            return None;
        }
        let key = (category.to_string(), equipment_type.to_string());
        if !contains(self.product_names.get(&key), product_name) {
            return Some(format!(
                "Product name '{}' is not listed for {} / {}",
                product_name, category, equipment_type
            ));
        }

        if product_number.is_empty() {
            return None;
        }
        let key = (
            category.to_string(),
            equipment_type.to_string(),
            product_name.to_string(),
        );
        if !contains(self.product_numbers.get(&key), product_number) {
            return Some(format!(
                "Product number '{}' is not listed for {} / {} / {}",
                product_number, category, equipment_type, product_name
            ));
        }

        None
    }
}

fn collect(set: Option<&BTreeSet<String>>) -> Vec<String> {
    set.map(|s| s.iter().cloned().collect()).unwrap_or_default()
}

fn contains(set: Option<&BTreeSet<String>>, value: &str) -> bool {
    set.map(|s| s.contains(value)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CatalogIndex {
        let entries = vec![
            CatalogEntry::new("Enclosure-Active", "Cabinet", "ModelX", "PN-2"),
            CatalogEntry::new("Enclosure-Active", "Cabinet", "ModelX", "PN-1"),
            CatalogEntry::new("Enclosure-Active", "Cabinet", "ModelX", "PN-1"),
            CatalogEntry::new("Enclosure-Active", "Shelter", "S-200", "PN-9"),
            CatalogEntry::new("MW-Passive", "Antenna", "Dish 0.6", "A06"),
        ];
        CatalogIndex::build(&entries)
    }

    #[test]
    fn test_product_numbers_sorted_and_deduplicated() {
        let index = sample();
        assert_eq!(
            index.product_numbers_for("Enclosure-Active", "Cabinet", "ModelX"),
            vec!["PN-1", "PN-2"]
        );
    }

    #[test]
    fn test_unknown_parent_yields_empty() {
        let index = sample();
        assert!(index
            .product_numbers_for("Enclosure-Active", "Cabinet", "ModelY")
            .is_empty());
        assert!(index.equipment_types_for("Nope").is_empty());
        assert!(index.product_names_for("", "Cabinet").is_empty());
    }

    #[test]
    fn test_cascade_queries() {
        let index = sample();
        assert_eq!(index.categories(), vec!["Enclosure-Active", "MW-Passive"]);
        assert_eq!(
            index.equipment_types_for("Enclosure-Active"),
            vec!["Cabinet", "Shelter"]
        );
        assert_eq!(
            index.product_names_for("MW-Passive", "Antenna"),
            vec!["Dish 0.6"]
        );
    }

    #[test]
    fn test_check_selection() {
        let index = sample();
        let mut fields = RecordFields {
            category: "Enclosure-Active".into(),
            equipment_type: "Cabinet".into(),
            product_name: "ModelX".into(),
            product_number: "PN-1".into(),
            ..Default::default()
        };
        assert_eq!(index.check_selection(&fields), None);

        fields.product_number = "PN-7".into();
        assert!(index
            .check_selection(&fields)
            .unwrap()
            .contains("Product number 'PN-7'"));

        fields.equipment_type = "Rack".into();
        assert!(index
            .check_selection(&fields)
            .unwrap()
            .contains("Equipment type 'Rack'"));
    }

    #[test]
    fn test_empty_catalog_is_permissive() {
        let index = CatalogIndex::empty();
        let fields = RecordFields {
            category: "Anything".into(),
            ..Default::default()
        };
        assert_eq!(index.check_selection(&fields), None);
        assert!(index.categories().is_empty());
    }

    #[test]
    fn test_incomplete_entries_index_their_prefix() {
        let entries = vec![CatalogEntry::new("Power", "Rectifier", "", "")];
        let index = CatalogIndex::build(&entries);
        assert_eq!(index.equipment_types_for("Power"), vec!["Rectifier"]);
        assert!(index.product_names_for("Power", "Rectifier").is_empty());
    }
}
