//! Records table search filter.

use crate::ChildRecord;

/// Records whose name, parent contact or gender contains `query`, ignoring case.
///
/// Store order is kept. An empty query matches every record.
pub fn search<'a>(records: &'a [ChildRecord], query: &str) -> Vec<&'a ChildRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r
                    .parent_contact
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
                || r.gender.as_str().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Gender, MeasurementInput, RecordStore};

    fn store() -> RecordStore {
        let mut store = RecordStore::new();
        for (name, gender, contact) in [
            ("Asep", Gender::Male, Some("Jl. Merdeka 5")),
            ("Siti Aminah", Gender::Female, None),
            ("Budi", Gender::Male, Some("0812-555")),
        ] {
            store
                .create(&MeasurementInput {
                    name: name.into(),
                    age_months: 24,
                    gender,
                    height_cm: 85.0,
                    weight_kg: 11.0,
                    parent_contact: contact.map(String::from),
                })
                .unwrap();
        }
        store
    }

    fn names(found: Vec<&ChildRecord>) -> Vec<&str> {
        found.into_iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_all_in_order() {
        let store = store();
        assert_eq!(names(search(store.records(), "")), vec!["Budi", "Siti Aminah", "Asep"]);
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let store = store();
        assert_eq!(names(search(store.records(), "aMiNaH")), vec!["Siti Aminah"]);
    }

    #[test]
    fn test_contact_match() {
        let store = store();
        assert_eq!(names(search(store.records(), "merdeka")), vec!["Asep"]);
        assert_eq!(names(search(store.records(), "0812")), vec!["Budi"]);
    }

    #[test]
    fn test_gender_match() {
        let store = store();
        // "male" is a substring of "female" too
        assert_eq!(search(store.records(), "male").len(), 3);
        assert_eq!(names(search(store.records(), "FEMALE")), vec!["Siti Aminah"]);
    }

    #[test]
    fn test_query_whitespace_is_significant() {
        let store = store();
        assert_eq!(names(search(store.records(), "siti ")), vec!["Siti Aminah"]);
        assert_eq!(names(search(store.records(), " aminah")), vec!["Siti Aminah"]);
        assert!(search(store.records(), " asep").is_empty());
    }

    #[test]
    fn test_no_match() {
        let store = store();
        assert!(search(store.records(), "zzz").is_empty());
    }
}
