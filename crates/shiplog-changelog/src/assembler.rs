//! Section assembly

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use shiplog_core::config::ChangelogConfig;
use shiplog_core::RunContext;

use crate::breaking::normalize;
use crate::types::{
    BreakingChange, ChangelogDocument, CommitRecord, DocumentMetadata, Entry, Section,
};

/// Groups classified commits into the ordered sections of a document
pub struct ChangelogAssembler {
    config: ChangelogConfig,
}

/// Section under construction with its dedup index
struct SectionBuilder {
    section: Section,
    index: HashMap<String, usize>,
}

impl SectionBuilder {
    fn new(section: Section) -> Self {
        Self {
            section,
            index: HashMap::new(),
        }
    }

    fn push(&mut self, record: &CommitRecord) {
        let key = normalize(&record.description);
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.section.entries[i];
                entry.commits.push(record.commit_ref());
                entry.breaking |= record.is_breaking;
                if entry.scope.is_none() {
                    entry.scope = record.scope.clone();
                }
            }
            None => {
                self.index.insert(key, self.section.entries.len());
                self.section.entries.push(Entry {
                    description: record.description.clone(),
                    scope: record.scope.clone(),
                    breaking: record.is_breaking,
                    commits: vec![record.commit_ref()],
                });
            }
        }
    }
}

impl ChangelogAssembler {
    /// Create an assembler over a type table
    pub fn new(config: ChangelogConfig) -> Self {
        Self { config }
    }

    /// Build the document; the same input always yields the same document
    #[instrument(parent = ctx.span(), skip_all, fields(range = %range, commit_count = records.len()))]
    pub fn assemble(
        &self,
        records: &[CommitRecord],
        range: &str,
        generated_at: DateTime<Utc>,
        ctx: &RunContext,
    ) -> ChangelogDocument {
        let mut ordered: Vec<&CommitRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.timestamp);

        let mut sections: Vec<SectionBuilder> = self
            .config
            .sections
            .iter()
            .map(|s| {
                let mut section = Section::new(&s.commit_type, &s.title);
                section.hidden = s.hidden;
                SectionBuilder::new(section)
            })
            .collect();
        let mut other = SectionBuilder::new(Section::new(
            &self.config.fallback_type,
            &self.config.fallback_title,
        ));

        let mut breaking: Vec<BreakingChange> = Vec::new();
        let mut breaking_index: HashMap<String, usize> = HashMap::new();

        for record in &ordered {
            let target = self
                .config
                .canonical_type(&record.commit_type)
                .and_then(|tag| sections.iter_mut().find(|b| b.section.commit_type == tag));
            match target {
                Some(builder) => builder.push(record),
                None => other.push(record),
            }

            if !record.is_breaking {
                continue;
            }
            for reason in &record.breaking_reasons {
                let key = normalize(reason);
                match breaking_index.get(&key) {
                    Some(&i) => {
                        let ids = &mut breaking[i].commits;
                        if !ids.contains(&record.id) {
                            ids.push(record.id.clone());
                        }
                    }
                    None => {
                        breaking_index.insert(key, breaking.len());
                        breaking.push(BreakingChange {
                            description: reason.clone(),
                            commits: vec![record.id.clone()],
                        });
                    }
                }
            }
        }

        sections.push(other);
        let sections: Vec<Section> = sections
            .into_iter()
            .map(|b| b.section)
            .filter(|s| !s.is_empty())
            .collect();

        debug!(
            section_count = sections.len(),
            breaking_count = breaking.len(),
            "changelog sections built"
        );
        info!(range, commits = records.len(), "changelog assembled");

        ChangelogDocument {
            metadata: DocumentMetadata {
                range: range.to_string(),
                generated_at,
                total_commits: records.len(),
            },
            sections,
            breaking_changes: breaking,
            summary: None,
        }
    }
}
