//! Per-commit extraction: classify the message, decide whether the change
//! itself is worth remembering, optionally enrich, cap, and materialize.

use gitlore_memory::{ExtractionSource, MemoryKind, MemoryStore};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use super::config::ExtractionConfig;
use super::draft::{truncate_content, MemoryDraft};
use super::enrich::TextEnricher;
use super::glob::GlobSet;
use super::materialize::{RecordMaterializer, StoreMaterializer};
use super::source::{ChangedFile, CommitSnapshot, CommitSource};
use crate::conventional::{parse_commit_message, ConventionalCommit};
use crate::error::Result;
use crate::observe::{observe, observe_extraction};

pub const VALID_MESSAGE_CONFIDENCE: f32 = 0.8;
pub const FREEFORM_MESSAGE_CONFIDENCE: f32 = 0.6;
pub const DIFF_CONFIDENCE: f32 = 0.7;

/// Free-form descriptions this short carry no useful fact.
const MIN_FREEFORM_DESCRIPTION: usize = 10;
const SUMMARY_LANGUAGES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub message_drafts: usize,
    pub diff_drafts: usize,
    pub total_created: usize,
    pub enriched_count: usize,
    pub elapsed_ms: u64,
}

/// Outcome of extracting one commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub commit_id: String,
    pub memory_ids: Vec<String>,
    pub stats: ExtractionStats,
}

/// Turns commits into memory records.
pub struct ExtractionEngine {
    config: ExtractionConfig,
    critical_paths: GlobSet,
    source: Arc<dyn CommitSource>,
    materializer: Arc<dyn RecordMaterializer>,
    enricher: Option<Arc<dyn TextEnricher>>,
}

impl ExtractionEngine {
    pub fn new(
        config: ExtractionConfig,
        source: Arc<dyn CommitSource>,
        materializer: Arc<dyn RecordMaterializer>,
    ) -> Result<Self> {
        config.validate()?;
        let critical_paths = GlobSet::new(&config.critical_path_globs);
        Ok(Self {
            config,
            critical_paths,
            source,
            materializer,
            enricher: None,
        })
    }

    /// Engine for previews. Nothing is embedded and records only ever reach
    /// a throwaway in-memory store.
    pub fn drafting(config: ExtractionConfig, source: Arc<dyn CommitSource>) -> Result<Self> {
        let store = Arc::new(MemoryStore::in_memory());
        Self::new(
            config,
            source,
            Arc::new(StoreMaterializer::without_embeddings(store)),
        )
    }

    /// Used only when `enrichmentEnabled` is set.
    pub fn with_enricher(mut self, enricher: Arc<dyn TextEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn CommitSource> {
        &self.source
    }

    /// Drafts for a loaded commit, capped, without enrichment or I/O.
    pub fn draft(&self, snapshot: &CommitSnapshot) -> Vec<MemoryDraft> {
        cap_drafts(self.build_drafts(snapshot), self.config.max_memories_per_commit)
    }

    /// Load, draft, enrich, cap and materialize one commit.
    ///
    /// Only a failure to load the commit is returned as an error; enrichment
    /// and materialization failures are logged and skipped.
    pub async fn extract_commit(&self, commit_id: &str) -> Result<ExtractionResult> {
        observe_extraction(commit_id, self.run(commit_id)).await
    }

    async fn run(&self, commit_id: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let snapshot = observe("load_commit", commit_id, self.source.load(commit_id)).await?;

        let mut drafts = self.build_drafts(&snapshot);
        let mut stats = ExtractionStats {
            message_drafts: count_from(&drafts, ExtractionSource::Message),
            diff_drafts: count_from(&drafts, ExtractionSource::Diff),
            ..Default::default()
        };

        stats.enriched_count = self.enrich_all(&mut drafts).await;
        let drafts = cap_drafts(drafts, self.config.max_memories_per_commit);

        let mut memory_ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let stored = observe(
                "materialize",
                &snapshot.id,
                self.materializer.materialize(draft, &snapshot),
            )
            .await;
            if let Ok(id) = stored {
                memory_ids.push(id);
            }
        }

        stats.total_created = memory_ids.len();
        stats.elapsed_ms = start.elapsed().as_millis() as u64;
        Ok(ExtractionResult {
            commit_id: snapshot.id.clone(),
            memory_ids,
            stats,
        })
    }

    /// Rewrite drafts in place; returns how many were enriched.
    async fn enrich_all(&self, drafts: &mut [MemoryDraft]) -> usize {
        let enricher = match (&self.enricher, self.config.enrichment_enabled) {
            (Some(enricher), true) => enricher,
            _ => return 0,
        };

        let mut enriched = 0;
        for draft in drafts.iter_mut() {
            let rewritten = observe("enrich", draft.kind.as_str(), enricher.enrich(draft)).await;
            if let Ok(Some(content)) = rewritten {
                draft.apply_enrichment(content, self.config.max_content_length);
                enriched += 1;
            }
        }
        enriched
    }

    fn build_drafts(&self, snapshot: &CommitSnapshot) -> Vec<MemoryDraft> {
        let commit = parse_commit_message(&snapshot.message);
        self.message_draft(snapshot, &commit)
            .into_iter()
            .chain(self.diff_draft(snapshot, &commit))
            .collect()
    }

    /// Factual draft from the commit message, if it says anything useful.
    pub fn message_draft(
        &self,
        snapshot: &CommitSnapshot,
        commit: &ConventionalCommit,
    ) -> Option<MemoryDraft> {
        let (content, confidence) = if commit.is_valid {
            (format_conventional(commit), VALID_MESSAGE_CONFIDENCE)
        } else if commit.description.chars().count() > MIN_FREEFORM_DESCRIPTION {
            (commit.description.clone(), FREEFORM_MESSAGE_CONFIDENCE)
        } else {
            return None;
        };

        let draft = MemoryDraft::new(
            MemoryKind::Factual,
            ExtractionSource::Message,
            truncate_content(&content, self.config.max_content_length),
            confidence,
        )
        .with_metadata("conventionalType", commit.commit_type.as_str())
        .with_metadata("scope", commit.scope.clone())
        .with_metadata("breaking", commit.breaking)
        .with_metadata("issues", commit.issues.clone())
        .with_metadata("author", snapshot.author.clone())
        .with_commit(&snapshot.id)
        .with_source_paths(snapshot.files.iter().map(|f| f.path.clone()));

        Some(draft)
    }

    /// Episodic draft summarizing the change, when it is large enough or
    /// touches a critical path.
    pub fn diff_draft(
        &self,
        snapshot: &CommitSnapshot,
        commit: &ConventionalCommit,
    ) -> Option<MemoryDraft> {
        let files = &snapshot.files;
        if files.is_empty() {
            return None;
        }

        let added: usize = files.iter().map(|f| f.added).sum();
        let removed: usize = files.iter().map(|f| f.removed).sum();
        let total = added + removed;
        let critical: Vec<&str> = files
            .iter()
            .map(|f| f.path.as_str())
            .filter(|p| self.critical_paths.is_match(p))
            .collect();

        if total < self.config.diff_threshold && critical.is_empty() {
            return None;
        }

        let languages = language_counts(files);
        let description = commit.is_valid.then_some(commit.description.as_str());
        let summary = summarize_change(
            files.len(),
            added,
            removed,
            &top_languages(&languages, SUMMARY_LANGUAGES),
            description,
        );
        let complexity = (files.iter().map(|f| f.complexity).sum::<f64>() * 10.0).round() / 10.0;
        let change_types: BTreeSet<&str> = files.iter().map(|f| f.change_type.as_str()).collect();

        let mut draft = MemoryDraft::new(
            MemoryKind::Episodic,
            ExtractionSource::Diff,
            truncate_content(&summary, self.config.max_content_length),
            DIFF_CONFIDENCE,
        )
        .with_metadata("filesChanged", files.len())
        .with_metadata("linesAdded", added)
        .with_metadata("linesRemoved", removed)
        .with_metadata("totalChanges", total)
        .with_metadata("languages", languages.keys().copied().collect::<Vec<_>>())
        .with_metadata("complexity", complexity)
        .with_metadata("changeTypes", change_types.into_iter().collect::<Vec<_>>())
        .with_commit(&snapshot.id)
        .with_source_paths(files.iter().map(|f| f.path.clone()));

        if !critical.is_empty() {
            draft = draft.with_metadata("criticalFiles", critical);
        }
        Some(draft)
    }
}

/// Keep the first `max` drafts in construction order.
pub fn cap_drafts(mut drafts: Vec<MemoryDraft>, max: usize) -> Vec<MemoryDraft> {
    drafts.truncate(max);
    drafts
}

fn count_from(drafts: &[MemoryDraft], source: ExtractionSource) -> usize {
    drafts.iter().filter(|d| d.extracted_from == source).count()
}

/// `type(scope): description.` with a breaking marker.
fn format_conventional(commit: &ConventionalCommit) -> String {
    let scope = commit
        .scope
        .as_deref()
        .map(|s| format!("({})", s))
        .unwrap_or_default();
    let description = commit.description.trim_end_matches('.');
    let mut content = format!("{}{}: {}.", commit.commit_type, scope, description);
    if commit.breaking {
        content.push_str(" [BREAKING CHANGE]");
    }
    content
}

fn language_counts(files: &[ChangedFile]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for lang in files.iter().filter_map(|f| f.language.as_deref()) {
        *counts.entry(lang).or_insert(0) += 1;
    }
    counts
}

/// Highest count first, ties by name.
fn top_languages<'a>(counts: &BTreeMap<&'a str, usize>, n: usize) -> Vec<&'a str> {
    let mut ranked: Vec<(&str, usize)> = counts.iter().map(|(l, c)| (*l, *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(n).map(|(l, _)| l).collect()
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

fn summarize_change(
    files: usize,
    added: usize,
    removed: usize,
    languages: &[&str],
    description: Option<&str>,
) -> String {
    let total = added + removed;
    let mut summary = format!(
        "Modified {} {}, added {} {}, removed {} {} ({} {} changed)",
        files,
        plural(files, "file"),
        added,
        plural(added, "line"),
        removed,
        plural(removed, "line"),
        total,
        plural(total, "line"),
    );
    if !languages.is_empty() {
        let _ = write!(summary, " in {}", languages.join(", "));
    }
    if let Some(description) = description.map(|d| d.trim_end_matches('.')) {
        if !description.is_empty() {
            let _ = write!(summary, ": {}", description);
        }
    }
    summary.push('.');
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeType;
    use crate::error::MinerError;
    use crate::extraction::source::StaticCommitSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMaterializer {
        stored: Mutex<Vec<MemoryDraft>>,
        fail_kind: Option<MemoryKind>,
    }

    #[async_trait]
    impl RecordMaterializer for RecordingMaterializer {
        async fn materialize(
            &self,
            draft: MemoryDraft,
            _commit: &CommitSnapshot,
        ) -> Result<String> {
            if Some(draft.kind) == self.fail_kind {
                return Err(MinerError::materialization("embedding service unavailable"));
            }
            let mut stored = self.stored.lock().unwrap();
            stored.push(draft);
            Ok(format!("mem-{}", stored.len()))
        }
    }

    enum Reply {
        Rewrite,
        Nothing,
        Fail,
    }

    struct ScriptedEnricher {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl ScriptedEnricher {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextEnricher for ScriptedEnricher {
        async fn enrich(&self, draft: &MemoryDraft) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Rewrite => Ok(Some(format!("Rewritten {} memory.", draft.kind.as_str()))),
                Reply::Nothing => Ok(None),
                Reply::Fail => Err(MinerError::enrichment("model timed out")),
            }
        }
    }

    fn changed(path: &str, language: Option<&str>, added: usize, removed: usize) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            change_type: ChangeType::Modify,
            added,
            removed,
            language: language.map(String::from),
            complexity: 1.5,
        }
    }

    fn engine_with(
        config: ExtractionConfig,
        snapshots: Vec<CommitSnapshot>,
        materializer: Arc<RecordingMaterializer>,
    ) -> ExtractionEngine {
        let source = snapshots
            .into_iter()
            .fold(StaticCommitSource::new(), |source, s| source.with(s));
        ExtractionEngine::new(config, Arc::new(source), materializer).unwrap()
    }

    fn pkce_commit() -> CommitSnapshot {
        CommitSnapshot::new("a1b2c3d4e5f6", "feat(auth)!: add PKCE to OAuth flow\n\nCloses #12")
            .with_author("Dana Reyes")
            .with_files(vec![changed("src/auth/pkce.rs", Some("rust"), 10, 2)])
    }

    fn fifty_line_commit() -> CommitSnapshot {
        CommitSnapshot::new("fff000111", "fix(core): handle empty input").with_files(vec![
            changed("src/a.rs", Some("rust"), 20, 5),
            changed("src/b.rs", Some("rust"), 10, 5),
            changed("tools/c.py", Some("python"), 8, 2),
        ])
    }

    fn engine(config: ExtractionConfig) -> ExtractionEngine {
        engine_with(config, vec![], Arc::new(RecordingMaterializer::default()))
    }

    #[tokio::test]
    async fn test_drafting_engine_needs_no_collaborators() {
        let source = Arc::new(StaticCommitSource::new().with(pkce_commit()));
        let preview = ExtractionEngine::drafting(ExtractionConfig::default(), source).unwrap();

        let drafts = preview.draft(&pkce_commit());
        assert_eq!(drafts, engine(ExtractionConfig::default()).draft(&pkce_commit()));

        let result = preview.extract_commit("a1b2c3d").await.unwrap();
        assert_eq!(result.memory_ids.len(), 2);
        assert_eq!(result.stats.enriched_count, 0);
    }

    #[test]
    fn test_breaking_scoped_commit_on_critical_path() {
        let drafts = engine(ExtractionConfig::default()).draft(&pkce_commit());
        assert_eq!(drafts.len(), 2);

        let factual = &drafts[0];
        assert_eq!(factual.kind, MemoryKind::Factual);
        assert_eq!(factual.extracted_from, ExtractionSource::Message);
        assert_eq!(factual.content, "feat(auth): add PKCE to OAuth flow. [BREAKING CHANGE]");
        assert_eq!(factual.confidence, VALID_MESSAGE_CONFIDENCE);
        assert_eq!(factual.metadata["breaking"], true);
        assert_eq!(factual.metadata["scope"], "auth");
        assert_eq!(factual.metadata["conventionalType"], "feat");
        assert_eq!(factual.metadata["issues"], serde_json::json!([12]));
        assert_eq!(factual.metadata["author"], "Dana Reyes");
        assert_eq!(factual.commit_ids, vec!["a1b2c3d4e5f6".to_string()]);

        // 12 lines is under the threshold; the auth path makes it critical
        let episodic = &drafts[1];
        assert_eq!(episodic.kind, MemoryKind::Episodic);
        assert_eq!(episodic.confidence, DIFF_CONFIDENCE);
        assert_eq!(episodic.metadata["criticalFiles"], serde_json::json!(["src/auth/pkce.rs"]));
    }

    #[test]
    fn test_small_change_has_no_diff_draft() {
        let snapshot = CommitSnapshot::new("abc", "chore: tidy helpers")
            .with_files(vec![changed("lib/util.py", Some("python"), 10, 5)]);
        let drafts = engine(ExtractionConfig::default()).draft(&snapshot);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, MemoryKind::Factual);
        assert_eq!(drafts[0].content, "chore: tidy helpers.");
        assert_eq!(drafts[0].metadata["scope"], serde_json::Value::Null);
    }

    #[test]
    fn test_fifty_lines_produce_one_episodic_draft() {
        let drafts = engine(ExtractionConfig::default()).draft(&fifty_line_commit());
        let episodic: Vec<&MemoryDraft> = drafts
            .iter()
            .filter(|d| d.kind == MemoryKind::Episodic)
            .collect();
        assert_eq!(episodic.len(), 1);

        let draft = episodic[0];
        assert_eq!(
            draft.content,
            "Modified 3 files, added 38 lines, removed 12 lines (50 lines changed) in rust, python: handle empty input."
        );
        assert_eq!(draft.metadata["filesChanged"], 3);
        assert_eq!(draft.metadata["totalChanges"], 50);
        assert_eq!(draft.metadata["languages"], serde_json::json!(["python", "rust"]));
        assert_eq!(draft.metadata["changeTypes"], serde_json::json!(["modify"]));
        assert_eq!(draft.metadata["complexity"], 4.5);
        assert!(draft.metadata.get("criticalFiles").is_none());
        assert_eq!(draft.source_paths.len(), 3);
    }

    #[test]
    fn test_freeform_messages() {
        let engine = engine(ExtractionConfig::default());

        let long = CommitSnapshot::new("abc", "- update retry logic for flaky uploads");
        let drafts = engine.draft(&long);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].content, "Retry logic for flaky uploads.");
        assert_eq!(drafts[0].confidence, FREEFORM_MESSAGE_CONFIDENCE);
        assert_eq!(drafts[0].metadata["conventionalType"], "other");

        let short = CommitSnapshot::new("abd", "wip stuff");
        assert!(engine.draft(&short).is_empty());
    }

    #[test]
    fn test_diff_summary_omits_description_for_freeform_messages() {
        let snapshot = CommitSnapshot::new("abc", "Reworked the whole importer")
            .with_files(vec![changed("importer.go", Some("go"), 40, 0)]);
        let drafts = engine(ExtractionConfig::default()).draft(&snapshot);
        assert_eq!(
            drafts[1].content,
            "Modified 1 file, added 40 lines, removed 0 lines (40 lines changed) in go."
        );
    }

    #[test]
    fn test_content_is_truncated() {
        let config = ExtractionConfig {
            max_content_length: 20,
            ..Default::default()
        };
        let drafts = engine(config).draft(&pkce_commit());
        for draft in &drafts {
            assert!(draft.content.chars().count() <= 20);
            assert!(draft.content.ends_with("..."));
        }
    }

    #[test]
    fn test_cap_keeps_first_drafts_in_order() {
        let drafts: Vec<MemoryDraft> = (0..7)
            .map(|i| {
                let (kind, source) = if i < 4 {
                    (MemoryKind::Factual, ExtractionSource::Message)
                } else {
                    (MemoryKind::Episodic, ExtractionSource::Diff)
                };
                MemoryDraft::new(kind, source, format!("draft {}", i), 0.7)
            })
            .collect();

        let capped = cap_drafts(drafts, 5);
        let contents: Vec<&str> = capped.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["draft 0", "draft 1", "draft 2", "draft 3", "draft 4"]);
    }

    #[tokio::test]
    async fn test_extract_commit_materializes_drafts() {
        let materializer = Arc::new(RecordingMaterializer::default());
        let engine = engine_with(
            ExtractionConfig::default(),
            vec![pkce_commit()],
            materializer.clone(),
        );

        let result = engine.extract_commit("a1b2c3d").await.unwrap();
        assert_eq!(result.commit_id, "a1b2c3d4e5f6");
        assert_eq!(result.memory_ids, vec!["mem-1".to_string(), "mem-2".to_string()]);
        assert_eq!(result.stats.message_drafts, 1);
        assert_eq!(result.stats.diff_drafts, 1);
        assert_eq!(result.stats.total_created, 2);
        assert_eq!(result.stats.enriched_count, 0);

        let stored = materializer.stored.lock().unwrap();
        assert_eq!(*stored, engine.draft(&pkce_commit()));
    }

    #[tokio::test]
    async fn test_cap_applies_before_materialization() {
        let materializer = Arc::new(RecordingMaterializer::default());
        let config = ExtractionConfig {
            max_memories_per_commit: 1,
            ..Default::default()
        };
        let engine = engine_with(config, vec![pkce_commit()], materializer.clone());

        let result = engine.extract_commit("a1b2c3d4e5f6").await.unwrap();
        assert_eq!(result.stats.total_created, 1);
        assert_eq!(result.stats.diff_drafts, 1);
        assert_eq!(materializer.stored.lock().unwrap()[0].kind, MemoryKind::Factual);
    }

    #[tokio::test]
    async fn test_unknown_commit_aborts() {
        let engine = engine(ExtractionConfig::default());
        let err = engine.extract_commit("deadbeef").await.unwrap_err();
        assert!(matches!(err, MinerError::UnknownCommit(id) if id == "deadbeef"));
    }

    #[tokio::test]
    async fn test_materialization_failure_skips_one_draft() {
        let materializer = Arc::new(RecordingMaterializer {
            fail_kind: Some(MemoryKind::Factual),
            ..Default::default()
        });
        let engine = engine_with(
            ExtractionConfig::default(),
            vec![pkce_commit()],
            materializer.clone(),
        );

        let result = engine.extract_commit("a1b2c3d4e5f6").await.unwrap();
        assert_eq!(result.memory_ids.len(), 1);
        assert_eq!(result.stats.total_created, 1);
        assert_eq!(materializer.stored.lock().unwrap()[0].kind, MemoryKind::Episodic);
    }

    fn enriching_config() -> ExtractionConfig {
        ExtractionConfig {
            enrichment_enabled: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_enrichment_rewrites_and_bumps_confidence() {
        let materializer = Arc::new(RecordingMaterializer::default());
        let enricher = ScriptedEnricher::new(Reply::Rewrite);
        let engine = engine_with(enriching_config(), vec![pkce_commit()], materializer.clone())
            .with_enricher(enricher.clone());

        let result = engine.extract_commit("a1b2c3d4e5f6").await.unwrap();
        assert_eq!(result.stats.enriched_count, 2);
        assert_eq!(result.memory_ids.len(), 2);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 2);

        let stored = materializer.stored.lock().unwrap();
        assert_eq!(stored[0].content, "Rewritten factual memory.");
        assert!((stored[0].confidence - 0.9).abs() < 1e-6);
        assert!((stored[1].confidence - 0.8).abs() < 1e-6);
        assert!(stored.iter().all(|d| d.is_enriched()));
    }

    #[tokio::test]
    async fn test_enrichment_failure_leaves_drafts_unchanged() {
        for reply in [Reply::Fail, Reply::Nothing] {
            let materializer = Arc::new(RecordingMaterializer::default());
            let engine = engine_with(enriching_config(), vec![pkce_commit()], materializer.clone())
                .with_enricher(ScriptedEnricher::new(reply));

            let result = engine.extract_commit("a1b2c3d4e5f6").await.unwrap();
            assert_eq!(result.stats.enriched_count, 0);
            assert_eq!(result.memory_ids.len(), 2);

            let stored = materializer.stored.lock().unwrap();
            assert_eq!(*stored, engine.draft(&pkce_commit()));
        }
    }

    #[tokio::test]
    async fn test_enricher_unused_when_disabled() {
        let enricher = ScriptedEnricher::new(Reply::Rewrite);
        let engine = engine_with(
            ExtractionConfig::default(),
            vec![pkce_commit()],
            Arc::new(RecordingMaterializer::default()),
        )
        .with_enricher(enricher.clone());

        engine.extract_commit("a1b2c3d4e5f6").await.unwrap();
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ExtractionConfig {
            max_memories_per_commit: 0,
            ..Default::default()
        };
        let result = ExtractionEngine::new(
            config,
            Arc::new(StaticCommitSource::new()),
            Arc::new(RecordingMaterializer::default()),
        );
        assert!(result.is_err());
    }
}
