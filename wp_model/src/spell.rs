//! 基于词表的拼写检查：编辑距离不超过 2 的词按“距离 -> 词频 -> 字母序”排序。
use std::{cell::RefCell, rc::Rc};

use wp_core::{filter::capitalize, spell::SpellChecker};

use crate::memory::MemoryModel;

const DEFAULT_MAX_DISTANCE: usize = 2;
const DEFAULT_LIMIT: usize = 5;

pub struct VocabularySpellChecker {
    model: Rc<RefCell<MemoryModel>>,
    max_distance: usize,
    limit: usize,
}

impl VocabularySpellChecker {
    pub fn new(model: Rc<RefCell<MemoryModel>>) -> Self {
        Self {
            model,
            max_distance: DEFAULT_MAX_DISTANCE,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn max_distance(mut self, n: usize) -> Self {
        self.max_distance = n;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = n.max(1);
        self
    }
}

impl SpellChecker for VocabularySpellChecker {
    fn suggestions(&mut self, word: &str) -> Vec<String> {
        // 数字、符号不检查
        if !word.chars().any(char::is_alphabetic) || word.chars().any(|c| c.is_ascii_digit()) {
            return Vec::new();
        }
        let vocabulary = self.model.borrow().vocabulary();
        let lower = word.to_lowercase();
        if vocabulary.contains_key(word) || vocabulary.contains_key(&lower) {
            return Vec::new();
        }

        let len = lower.chars().count();
        let mut ranked: Vec<(usize, u32, &str)> = vocabulary
            .iter()
            .filter(|(candidate, _)| candidate.chars().count().abs_diff(len) <= self.max_distance)
            .filter_map(|(candidate, &count)| {
                let distance = levenshtein(&lower, &candidate.to_lowercase());
                (distance <= self.max_distance).then_some((distance, count, candidate.as_str()))
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.2.cmp(b.2))
        });

        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        let mut out: Vec<String> = Vec::new();
        for (_, _, candidate) in ranked {
            let suggestion = if capitalized {
                capitalize(candidate)
            } else {
                candidate.to_string()
            };
            if !out.contains(&suggestion) {
                out.push(suggestion);
            }
            if out.len() >= self.limit {
                break;
            }
        }
        tracing::trace!(word, suggestions = out.len(), "拼写检查");
        out
    }
}

/// 字符级编辑距离（插入/删除/替换各算 1）。
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            row[j + 1] = substitute.min(prev[j + 1] + 1).min(row[j] + 1);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_distance() {
        assert_eq!(levenshtein("helo", "hello"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("café", "cafe"), 1);
        assert_eq!(levenshtein("same", "same"), 0);
    }
}
