use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

/// Identifies one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckpointKey {
    /// Collection (department, queue) the conversations came from
    pub collection: String,
    /// Evaluation kind, usually the prompt name
    pub kind: String,
    pub date: NaiveDate,
}

impl CheckpointKey {
    pub fn new(collection: impl Into<String>, kind: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            collection: collection.into(),
            kind: kind.into(),
            date,
        }
    }

    /// Key dated the day before today, which is when daily exports are judged.
    pub fn for_yesterday(collection: impl Into<String>, kind: impl Into<String>) -> Self {
        let today = Local::now().date_naive();
        Self::new(collection, kind, today.pred_opt().unwrap_or(today))
    }

    fn collection_slug(&self) -> String {
        self.collection.trim().to_lowercase().replace(' ', "_")
    }

    fn file_prefix(&self) -> &str {
        match self.kind.as_str() {
            "sentiment_analysis" => "saprompt",
            other => other,
        }
    }

    /// `{kind}_{collection}_{MM_DD}.csv`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.csv",
            self.file_prefix(),
            self.collection_slug(),
            self.date.format("%m_%d")
        )
    }

    /// Path relative to the artifact root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.date.format("%Y-%m-%d").to_string()).join(self.file_name())
    }
}

impl fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.kind, self.collection, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rule_breaking", "Doctors", "rule_breaking_doctors_08_01.csv")]
    #[case("sentiment_analysis", "MV Sales", "saprompt_mv_sales_08_01.csv")]
    #[case("ftr", " CC Resolvers ", "ftr_cc_resolvers_08_01.csv")]
    fn names_artifacts(#[case] kind: &str, #[case] collection: &str, #[case] expected: &str) {
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let key = CheckpointKey::new(collection, kind, date);
        assert_eq!(key.file_name(), expected);
        assert_eq!(
            key.relative_path(),
            PathBuf::from("2025-08-01").join(expected)
        );
    }

    #[test]
    fn yesterday_is_one_day_back() {
        let key = CheckpointKey::for_yesterday("x", "y");
        let today = Local::now().date_naive();
        assert_eq!(key.date.succ_opt(), Some(today));
    }
}
