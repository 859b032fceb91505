use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::GraphModel;

/// Ids matching the active query. Recomputed wholesale on every query.
#[derive(Default)]
pub struct SearchIndex {
    query: String,
    matches: HashSet<String>,
}

impl SearchIndex {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &HashSet<String> {
        &self.matches
    }

    pub fn is_match(&self, id: &str) -> bool {
        self.matches.contains(id)
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Case-insensitive substring match on node ids, whitespace included. A
    /// blank query clears the result set.
    pub fn search(&mut self, model: &GraphModel, query: &str) {
        self.query.clear();
        if !query.trim().is_empty() {
            self.query.push_str(query);
        }
        self.refresh(model);
    }

    /// Re-runs the current query against a newly loaded model.
    pub fn refresh(&mut self, model: &GraphModel) {
        self.matches.clear();
        if self.query.is_empty() {
            return;
        }

        let needle = self.query.to_lowercase();
        self.matches.extend(
            model
                .nodes()
                .iter()
                .filter(|node| node.id.to_lowercase().contains(&needle))
                .map(|node| node.id.clone()),
        );
        log::debug!("search {:?} matched {} nodes", self.query, self.matches.len());
    }

    /// Matching ids ordered by fuzzy score, best first; ties fall back to
    /// the id itself.
    pub fn ranked(&self, limit: usize) -> Vec<String> {
        let matcher = SkimMatcherV2::default().ignore_case();
        let mut scored = self
            .matches
            .iter()
            .map(|id| {
                let score = matcher.fuzzy_match(id, &self.query).unwrap_or(0);
                (score, id)
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, id)| id.clone())
            .collect()
    }
}
