use std::collections::HashMap;

use crate::model::FeedbackEntry;

/// A question whose answers are tallied by exact string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Overall,
    Program,
    Food,
    Management,
    Venue,
    Contribute,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 6] = [
        CategoricalField::Overall,
        CategoricalField::Program,
        CategoricalField::Food,
        CategoricalField::Management,
        CategoricalField::Venue,
        CategoricalField::Contribute,
    ];

    /// The column name.
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Overall => "overall",
            CategoricalField::Program => "program",
            CategoricalField::Food => "food",
            CategoricalField::Management => "management",
            CategoricalField::Venue => "venue",
            CategoricalField::Contribute => "contribute",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoricalField::Overall => "Overall Experience",
            CategoricalField::Program => "Program Content",
            CategoricalField::Food => "Food",
            CategoricalField::Management => "Management",
            CategoricalField::Venue => "Venue",
            CategoricalField::Contribute => "Interested in Volunteering",
        }
    }

    pub fn value(self, entry: &FeedbackEntry) -> &str {
        match self {
            CategoricalField::Overall => &entry.overall,
            CategoricalField::Program => &entry.program,
            CategoricalField::Food => &entry.food,
            CategoricalField::Management => &entry.management,
            CategoricalField::Venue => &entry.venue,
            CategoricalField::Contribute => &entry.contribute,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub total_count: usize,
    pub counts: HashMap<CategoricalField, HashMap<String, usize>>,
}

impl FeedbackSummary {
    pub fn counts_for(&self, field: CategoricalField) -> Option<&HashMap<String, usize>> {
        self.counts.get(&field)
    }

    /// Buckets for `field`, most frequent first and ties broken by value, for display.
    pub fn ranked(&self, field: CategoricalField) -> Vec<(String, usize)> {
        let mut buckets: Vec<(String, usize)> = self
            .counts_for(field)
            .map(|counts| counts.iter().map(|(v, &c)| (v.clone(), c)).collect())
            .unwrap_or_default();
        buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        buckets
    }
}

/// Counts every distinct value of each categorical field. Values are compared exactly, so case
/// and surrounding whitespace make separate buckets, and the empty string is a bucket of its own.
pub fn aggregate(entries: &[FeedbackEntry]) -> FeedbackSummary {
    let mut counts: HashMap<CategoricalField, HashMap<String, usize>> = CategoricalField::ALL
        .iter()
        .map(|&field| (field, HashMap::new()))
        .collect();

    for entry in entries {
        for field in CategoricalField::ALL {
            if let Some(tally) = counts.get_mut(&field) {
                *tally.entry(field.value(entry).to_string()).or_insert(0) += 1;
            }
        }
    }

    FeedbackSummary {
        total_count: entries.len(),
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i32, overall: &str, food: &str, contribute: &str) -> FeedbackEntry {
        FeedbackEntry {
            id,
            overall: overall.to_string(),
            program: "Good".to_string(),
            food: food.to_string(),
            management: "OK".to_string(),
            venue: "OK".to_string(),
            favorite: String::new(),
            suggestions: String::new(),
            contribute: contribute.to_string(),
            comments: String::new(),
            timestamp: "2025-03-01 18:30:00".to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total_count, 0);
        for field in CategoricalField::ALL {
            assert!(summary.counts_for(field).unwrap().is_empty());
        }
    }

    #[test]
    fn test_counts_sum_to_total() {
        let entries = vec![
            entry(1, "Great", "", "Yes"),
            entry(2, "Good", "Tasty", ""),
            entry(3, "Great", "", "No"),
            entry(4, "", "Cold", "Yes"),
            entry(5, "Poor", "", ""),
        ];
        let summary = aggregate(&entries);

        assert_eq!(summary.total_count, 5);
        for field in CategoricalField::ALL {
            let sum: usize = summary.counts_for(field).unwrap().values().sum();
            assert_eq!(sum, 5, "counts for {} should sum to 5", field.name());
        }
    }

    #[test]
    fn test_empty_string_is_a_bucket() {
        let summary = aggregate(&[entry(1, "Great", "", "Yes")]);

        assert_eq!(summary.counts_for(CategoricalField::Overall).unwrap()["Great"], 1);
        assert_eq!(summary.counts_for(CategoricalField::Food).unwrap()[""], 1);
    }

    #[test]
    fn test_case_sensitive() {
        let entries = vec![
            entry(1, "Great", "", ""),
            entry(2, "Great", "", ""),
            entry(3, "great", "", ""),
            entry(4, "Great ", "", ""),
        ];
        let summary = aggregate(&entries);
        let overall = summary.counts_for(CategoricalField::Overall).unwrap();

        assert_eq!(overall.len(), 3);
        assert_eq!(overall["Great"], 2);
        assert_eq!(overall["great"], 1);
        assert_eq!(overall["Great "], 1);
    }

    #[test]
    fn test_ranked() {
        let entries = vec![
            entry(1, "Good", "", ""),
            entry(2, "Great", "", ""),
            entry(3, "Great", "", ""),
            entry(4, "Average", "", ""),
        ];
        let summary = aggregate(&entries);

        assert_eq!(
            summary.ranked(CategoricalField::Overall),
            vec![
                ("Great".to_string(), 2),
                ("Average".to_string(), 1),
                ("Good".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_free_text_fields_not_tallied() {
        let summary = aggregate(&[entry(1, "Great", "", "")]);
        assert_eq!(summary.counts.len(), CategoricalField::ALL.len());
    }
}
