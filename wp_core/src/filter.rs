//! `filter`：预测候选后处理（大写、去重、截断）。

use std::collections::HashSet;

/// Filter：对候选列表做后处理。
pub trait Filter {
    fn apply(&self, choices: Vec<String>) -> Vec<String>;
}

/// 句首：每个候选首字母大写。
pub struct CapitalizeFirst;

impl Filter for CapitalizeFirst {
    fn apply(&self, choices: Vec<String>) -> Vec<String> {
        choices.into_iter().map(|c| capitalize(&c)).collect()
    }
}

/// 默认 filter：保持顺序去重，截断到 limit。
pub struct DedupTruncate {
    pub limit: usize,
}

impl Filter for DedupTruncate {
    fn apply(&self, mut choices: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        choices.retain(|c| !c.is_empty() && seen.insert(c.clone()));
        choices.truncate(self.limit.max(1));
        choices
    }
}

/// 首字母大写（其余保持原样）。
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(
            CapitalizeFirst.apply(words(&["fox", "über", "iPhone", ""])),
            words(&["Fox", "Über", "IPhone", ""])
        );
    }

    #[test]
    fn dedup_keeps_first_and_truncates() {
        let filter = DedupTruncate { limit: 3 };
        assert_eq!(
            filter.apply(words(&["Fox", "fox", "Fox", "", "foxes", "fond"])),
            words(&["Fox", "fox", "foxes"])
        );
    }
}
