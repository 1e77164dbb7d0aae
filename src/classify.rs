use serde::Serialize;

use crate::data::TabularDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnClass {
    Categorical,
    Numeric,
}

impl ColumnClass {
    /// Normalise an external type tag; unknown tags are not classified
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" | "category" => Some(ColumnClass::Categorical),
            "numeric" => Some(ColumnClass::Numeric),
            _ => None,
        }
    }
}

/// Column classes in dataset column order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Classification {
    pub columns: Vec<(String, ColumnClass)>,
}

impl Classification {
    pub fn get(&self, column: &str) -> Option<ColumnClass> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, class)| *class)
    }

    pub fn categorical(&self) -> Vec<&str> {
        self.of_class(ColumnClass::Categorical)
    }

    pub fn numeric(&self) -> Vec<&str> {
        self.of_class(ColumnClass::Numeric)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn of_class(&self, class: ColumnClass) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, c)| *c == class)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Classify every dataset column from the parser's type tags.
///
/// Columns without a tag, or with an unrecognised tag, are left out.
/// Tags for names that are not dataset columns are ignored.
pub fn classify(dataset: &TabularDataset) -> Classification {
    let columns = dataset
        .columns
        .iter()
        .filter_map(|name| {
            let tag = dataset.column_types.get(name)?;
            let class = ColumnClass::from_tag(tag);
            if class.is_none() {
                log::debug!("column '{}' has unrecognised type tag '{}'", name, tag);
            }
            class.map(|c| (name.clone(), c))
        })
        .collect();

    Classification { columns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn dataset(types: &[(&str, &str)]) -> TabularDataset {
        TabularDataset::new(
            vec!["region".into(), "kind".into(), "q1".into(), "note".into()],
            vec![],
            types
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_classify_tags() {
        let ds = dataset(&[
            ("region", "string"),
            ("kind", "category"),
            ("q1", "numeric"),
            ("note", "datetime"),
        ]);
        let c = classify(&ds);
        assert_eq!(c.categorical(), vec!["region", "kind"]);
        assert_eq!(c.numeric(), vec!["q1"]);
        assert_eq!(c.get("note"), None);
    }

    #[test]
    fn test_classify_without_types() {
        let c = classify(&dataset(&[]));
        assert!(c.is_empty());
        assert!(c.categorical().is_empty());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let ds = dataset(&[("q1", "numeric"), ("region", "string")]);
        assert_eq!(classify(&ds), classify(&ds));
        // Column order follows the dataset, not the tag map
        assert_eq!(classify(&ds).columns[0].0, "region");
    }
}
