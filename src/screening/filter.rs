use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::model::{AnnotatedRow, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NoMatch,
    NameMatch,
    DescriptionMatch,
    AnyMatch,
}

impl Category {
    /// Membership test: a row with a name match belongs to both `NameMatch`
    /// and `AnyMatch`.
    pub fn includes(&self, row: &AnnotatedRow) -> bool {
        let name = !row.name_matches.is_empty();
        let description = !row.description_matches.is_empty();
        match self {
            Category::NoMatch => !name && !description,
            Category::NameMatch => name,
            Category::DescriptionMatch => description,
            Category::AnyMatch => name || description,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NoMatch => "none",
            Category::NameMatch => "name",
            Category::DescriptionMatch => "description",
            Category::AnyMatch => "any",
        }
    }
}

/// Most specific category of a row: `AnyMatch` when both fields matched.
pub fn classify(row: &AnnotatedRow) -> Category {
    match (row.name_matches.is_empty(), row.description_matches.is_empty()) {
        (true, true) => Category::NoMatch,
        (false, true) => Category::NameMatch,
        (true, false) => Category::DescriptionMatch,
        (false, false) => Category::AnyMatch,
    }
}

/// Row selection for display and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    All,
    Only(Category),
}

impl View {
    pub fn includes(&self, row: &AnnotatedRow) -> bool {
        match self {
            View::All => true,
            View::Only(category) => category.includes(row),
        }
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(View::All),
            "name" => Ok(View::Only(Category::NameMatch)),
            "description" | "desc" => Ok(View::Only(Category::DescriptionMatch)),
            "any" => Ok(View::Only(Category::AnyMatch)),
            "none" => Ok(View::Only(Category::NoMatch)),
            _ => Err(format!(
                "unknown filter: {}. Use all, name, description, any or none",
                s
            )),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::All => write!(f, "all"),
            View::Only(category) => write!(f, "{}", category.as_str()),
        }
    }
}

pub fn filter_rows(rows: &[AnnotatedRow], view: View) -> Vec<AnnotatedRow> {
    rows.iter().filter(|row| view.includes(row)).cloned().collect()
}

pub fn summarize(rows: &[AnnotatedRow]) -> Summary {
    let count = |category: Category| rows.iter().filter(|row| category.includes(row)).count();

    Summary {
        total: rows.len(),
        name_matches: count(Category::NameMatch),
        description_matches: count(Category::DescriptionMatch),
        any_matches: count(Category::AnyMatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectRow;
    use crate::screening::{KeywordSet, annotate};

    fn annotated(name: &str, description: &str) -> AnnotatedRow {
        let keywords = KeywordSet::from_entries(["dairy", "cheese", "goat"]);
        annotate(&ProjectRow::new(name, description), &keywords)
    }

    #[test]
    fn test_name_only_row() {
        let row = annotated("Goat breeding", "Training program");

        assert_eq!(classify(&row), Category::NameMatch);
        assert!(Category::NameMatch.includes(&row));
        assert!(Category::AnyMatch.includes(&row));
        assert!(!Category::DescriptionMatch.includes(&row));
        assert!(!Category::NoMatch.includes(&row));
    }

    #[test]
    fn test_classify_all_cases() {
        assert_eq!(classify(&annotated("Road", "Fix highway")), Category::NoMatch);
        assert_eq!(classify(&annotated("Road", "cheese trucks")), Category::DescriptionMatch);
        assert_eq!(classify(&annotated("Dairy", "cheese")), Category::AnyMatch);
    }

    #[test]
    fn test_view_parse() {
        assert_eq!("all".parse::<View>().unwrap(), View::All);
        assert_eq!("".parse::<View>().unwrap(), View::All);
        assert_eq!("Name".parse::<View>().unwrap(), View::Only(Category::NameMatch));
        assert_eq!(
            "description".parse::<View>().unwrap(),
            View::Only(Category::DescriptionMatch)
        );
        assert_eq!(" any ".parse::<View>().unwrap(), View::Only(Category::AnyMatch));
        assert_eq!("none".parse::<View>().unwrap(), View::Only(Category::NoMatch));
        assert!("cows".parse::<View>().is_err());
    }

    #[test]
    fn test_view_display_round_trips() {
        for view in [
            View::All,
            View::Only(Category::NoMatch),
            View::Only(Category::NameMatch),
            View::Only(Category::DescriptionMatch),
            View::Only(Category::AnyMatch),
        ] {
            assert_eq!(view.to_string().parse::<View>().unwrap(), view);
        }
    }

    #[test]
    fn test_filter_and_summary() {
        let rows = vec![
            annotated("Goat breeding", "Training"),
            annotated("Road", "cheese trucks"),
            annotated("Dairy hub", "cheese"),
            annotated("Bridge", "Steel"),
        ];

        let names: Vec<String> = filter_rows(&rows, View::Only(Category::AnyMatch))
            .into_iter()
            .map(|r| r.row.name)
            .collect();
        assert_eq!(names, vec!["Goat breeding", "Road", "Dairy hub"]);

        assert_eq!(filter_rows(&rows, View::All).len(), 4);
        assert_eq!(filter_rows(&rows, View::Only(Category::NoMatch)).len(), 1);

        let summary = summarize(&rows);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.name_matches, 2);
        assert_eq!(summary.description_matches, 2);
        assert_eq!(summary.any_matches, 3);
    }
}
