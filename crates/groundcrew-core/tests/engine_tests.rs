//! End-to-end tests for the retrieval engine.
//!
//! These exercise the full pipeline over the in-memory store: mode
//! selection, concurrent scoring, fusion, and response shaping, including
//! the degraded paths (no corpus, no embeddings, provider down).

use std::collections::HashMap;

use groundcrew_core::embedding::Embedder;
use groundcrew_core::error::EmbedError;
use groundcrew_core::search::{
    Document, DocumentMetadata, RetrievalEngine, SearchMode, SearchRequest,
};
use groundcrew_core::storage::{CorpusStore, InMemoryCorpusStore};

const DIM: usize = 4;

/// Embedder returning canned vectors keyed by exact input text.
struct CannedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl CannedEmbedder {
    fn new() -> Self {
        Self {
            vectors: HashMap::new(),
        }
    }

    fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait::async_trait(?Send)]
impl Embedder for CannedEmbedder {
    fn embedding_dim(&self) -> usize {
        DIM
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EmbedError::Provider(format!("no canned vector for {:?}", text)))
    }
}

/// Embedder simulating an unreachable provider.
struct DownEmbedder;

#[async_trait::async_trait(?Send)]
impl Embedder for DownEmbedder {
    fn embedding_dim(&self) -> usize {
        DIM
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        Err(EmbedError::Provider("connection refused".to_string()))
    }
}

fn policy_doc(title: &str, content: &str, category: Option<&str>) -> Document {
    Document {
        title: title.to_string(),
        content: content.to_string(),
        metadata: DocumentMetadata {
            category: category.map(str::to_string),
            source: Some(format!("{}.md", title.to_lowercase().replace(' ', "_"))),
            ..Default::default()
        },
    }
}

async fn seed(store: &InMemoryCorpusStore, doc: Document, embedding: Option<&[f32]>) -> u64 {
    let id = store.add_document(doc).await.unwrap();
    if let Some(embedding) = embedding {
        store.put_embedding(id, embedding).await.unwrap();
    }
    id.as_u64()
}

fn request(query: &str, k: usize) -> SearchRequest {
    let mut request = SearchRequest::new(query);
    request.k = k;
    request
}

// ============================================================================
// Scenario A: lexical-only corpus
// ============================================================================

#[tokio::test]
async fn scenario_a_unembedded_corpus_ranks_by_lexical_score() {
    let store = InMemoryCorpusStore::new();
    seed(
        &store,
        policy_doc(
            "Refund policy",
            "Our refund policy covers cancelled flights. Refund requests are \
             processed within seven days.",
            Some("billing"),
        ),
        None,
    )
    .await;
    seed(
        &store,
        policy_doc(
            "Rebooking",
            "Rebooking after a cancellation follows the refund policy rules.",
            Some("billing"),
        ),
        None,
    )
    .await;
    seed(
        &store,
        policy_doc(
            "Crew rest",
            "Minimum crew rest periods between duty assignments.",
            Some("crew"),
        ),
        None,
    )
    .await;

    let engine = RetrievalEngine::new(store, DownEmbedder);
    let response = engine.search(&request("refund policy", 5)).await.unwrap();

    assert_eq!(response.mode, SearchMode::Bm25Only);
    assert!(!response.embeddings_available);
    // Two of three documents carry the query terms.
    assert_eq!(response.results.len(), 2);
    assert!(response.results[0].score >= response.results[1].score);
    assert_eq!(response.total_documents, 3);
    assert_eq!(response.category_counts.get("billing"), Some(&2));
}

// ============================================================================
// Scenario B: vector-only signal
// ============================================================================

#[tokio::test]
async fn scenario_b_vector_only_match_surfaces_document() {
    let store = InMemoryCorpusStore::new();

    // Five embedded documents; the query shares no terms with any of them.
    let mut ids = Vec::new();
    for (i, (title, content)) in [
        ("Weather delays", "Procedures for storm disruption handling."),
        ("Baggage limits", "Checked baggage weight allowances."),
        ("Pet transport", "Animals carried in the cabin or hold."),
        ("Meal service", "Catering windows on long-haul routes."),
        ("Lounge access", "Eligibility rules for lounge entry."),
    ]
    .iter()
    .enumerate()
    {
        let mut embedding = vec![0.0; DIM];
        embedding[i % DIM] = 1.0;
        if i >= DIM {
            // Keep vectors distinct once the axes run out.
            embedding[(i + 1) % DIM] = 1.0;
        }
        ids.push(
            seed(
                &store,
                policy_doc(title, content, None),
                Some(&embedding),
            )
            .await,
        );
    }

    // Query embedding sits on the same axis as "Pet transport" (index 2).
    let embedder =
        CannedEmbedder::new().with_vector("travelling with my dog", vec![0.0, 0.0, 1.0, 0.0]);

    let engine = RetrievalEngine::new(store, embedder);
    let response = engine
        .search(&request("travelling with my dog", 3))
        .await
        .unwrap();

    assert_eq!(response.mode, SearchMode::Hybrid);
    assert!(response.embeddings_available);
    assert!(!response.results.is_empty());

    // The semantically-close document leads despite zero lexical overlap,
    // scored as 0.5 x its normalized vector score = 0.5 x 1.0.
    let top = &response.results[0];
    assert_eq!(top.doc_id.as_u64(), ids[2]);
    assert!((top.score - 0.5).abs() < 1e-6);
}

// ============================================================================
// Scenario C: fewer candidates than requested
// ============================================================================

#[tokio::test]
async fn scenario_c_small_candidate_set_returns_what_exists() {
    let store = InMemoryCorpusStore::new();
    seed(
        &store,
        policy_doc("Visa rules", "Transit visa requirements.", Some("travel")),
        None,
    )
    .await;
    seed(
        &store,
        policy_doc("Customs", "Customs declarations for visa holders.", Some("travel")),
        None,
    )
    .await;
    seed(
        &store,
        policy_doc("Payroll", "Payroll calendar.", Some("internal")),
        None,
    )
    .await;

    let engine = RetrievalEngine::new(store, DownEmbedder);
    let mut req = request("visa", 5);
    req.category = Some("travel".to_string());
    let response = engine.search(&req).await.unwrap();

    // Exactly the two travel documents, no padding, no error.
    assert_eq!(response.results.len(), 2);
    assert!(response
        .results
        .iter()
        .all(|hit| hit.category.as_deref() == Some("travel")));
}

// ============================================================================
// Scenario D: uniform lexical scores, vector decides
// ============================================================================

#[tokio::test]
async fn scenario_d_uniform_lexical_scores_let_vector_decide() {
    let store = InMemoryCorpusStore::new();

    // Four documents with identical content, hence identical BM25 scores.
    let mut axes = Vec::new();
    for i in 0..4 {
        let mut embedding = vec![0.0; DIM];
        embedding[i] = 1.0;
        axes.push(
            seed(
                &store,
                policy_doc(
                    &format!("Diversion memo {}", i),
                    "diversion handling procedure",
                    None,
                ),
                Some(&embedding),
            )
            .await,
        );
    }

    // Query vector aligned with document 3's axis.
    let embedder =
        CannedEmbedder::new().with_vector("diversion", vec![0.0, 0.0, 0.0, 1.0]);

    let engine = RetrievalEngine::new(store, embedder);
    let response = engine.search(&request("diversion", 4)).await.unwrap();

    assert_eq!(response.results.len(), 4);
    // Identical lexical scores all normalize to 1.0 (no divide-by-zero),
    // so the vector component alone drives the ranking.
    assert_eq!(response.results[0].doc_id.as_u64(), axes[3]);
    assert!((response.results[0].score - 1.0).abs() < 1e-6);
    for hit in &response.results {
        assert!((0.0..=1.0).contains(&hit.score));
    }
}

// ============================================================================
// Mode monotonicity and degradation transparency
// ============================================================================

#[tokio::test]
async fn mode_is_never_hybrid_without_embeddings() {
    let store = InMemoryCorpusStore::new();
    seed(&store, policy_doc("Doc", "some searchable text", None), None).await;

    let engine = RetrievalEngine::new(store, CannedEmbedder::new());
    let response = engine.search(&request("searchable", 5)).await.unwrap();

    assert_eq!(response.mode, SearchMode::Bm25Only);
    assert!(!response.embeddings_available);
}

#[tokio::test]
async fn empty_corpus_always_reports_no_data() {
    let engine = RetrievalEngine::new(InMemoryCorpusStore::new(), CannedEmbedder::new());

    for query in ["anything", "refund", "x"] {
        let response = engine.search(&request(query, 5)).await.unwrap();
        assert_eq!(response.mode, SearchMode::NoData);
        assert!(response.results.is_empty());
    }
}

#[tokio::test]
async fn provider_outage_matches_lexical_only_results() {
    let content = [
        ("Refunds", "refund policy for cancellations"),
        ("Delays", "compensation for long delays"),
        ("Baggage", "lost baggage claims and refund options"),
    ];

    // Corpus 1: embedded, but the provider is down.
    let degraded_store = InMemoryCorpusStore::new();
    for (i, (title, text)) in content.iter().enumerate() {
        let mut embedding = vec![0.0; DIM];
        embedding[i % DIM] = 1.0;
        seed(
            &degraded_store,
            policy_doc(title, text, None),
            Some(&embedding),
        )
        .await;
    }
    let degraded = RetrievalEngine::new(degraded_store, DownEmbedder);

    // Corpus 2: identical documents, never embedded.
    let lexical_store = InMemoryCorpusStore::new();
    for (title, text) in &content {
        seed(&lexical_store, policy_doc(title, text, None), None).await;
    }
    let lexical_only = RetrievalEngine::new(lexical_store, DownEmbedder);

    let degraded_response = degraded.search(&request("refund", 5)).await.unwrap();
    let lexical_response = lexical_only.search(&request("refund", 5)).await.unwrap();

    // Same mode, same flag, same ranking - the outage is invisible except
    // through the flags.
    assert_eq!(degraded_response.mode, SearchMode::Bm25Only);
    assert!(!degraded_response.embeddings_available);

    let degraded_titles: Vec<&str> = degraded_response
        .results
        .iter()
        .map(|hit| hit.title.as_str())
        .collect();
    let lexical_titles: Vec<&str> = lexical_response
        .results
        .iter()
        .map(|hit| hit.title.as_str())
        .collect();
    assert_eq!(degraded_titles, lexical_titles);

    let degraded_scores: Vec<f32> = degraded_response.results.iter().map(|h| h.score).collect();
    let lexical_scores: Vec<f32> = lexical_response.results.iter().map(|h| h.score).collect();
    assert_eq!(degraded_scores, lexical_scores);
}

// ============================================================================
// Determinism and bounds
// ============================================================================

#[tokio::test]
async fn repeated_queries_return_identical_rankings() {
    let store = InMemoryCorpusStore::new();
    // Identical content forces score ties; ordering must still be stable.
    for i in 0..6 {
        let mut embedding = vec![0.0; DIM];
        embedding[i % DIM] = 1.0;
        seed(
            &store,
            policy_doc(&format!("Duplicate {}", i), "identical gate procedure", None),
            Some(&embedding),
        )
        .await;
    }

    let embedder = CannedEmbedder::new().with_vector("gate", vec![0.5; DIM]);
    let engine = RetrievalEngine::new(store, embedder);

    let first = engine.search(&request("gate", 6)).await.unwrap();
    let first_ids: Vec<u64> = first.results.iter().map(|h| h.doc_id.as_u64()).collect();

    // Tie-break by ascending id must actually be exercised.
    let mut sorted = first_ids.clone();
    sorted.sort_unstable();
    assert_eq!(first_ids, sorted);

    for _ in 0..10 {
        let again = engine.search(&request("gate", 6)).await.unwrap();
        let ids: Vec<u64> = again.results.iter().map(|h| h.doc_id.as_u64()).collect();
        assert_eq!(ids, first_ids);
    }
}

#[tokio::test]
async fn scores_stay_in_unit_interval_and_len_stays_under_k() {
    let store = InMemoryCorpusStore::new();
    for i in 0..10 {
        let mut embedding = vec![0.0; DIM];
        embedding[i % DIM] = 1.0;
        embedding[(i + 1) % DIM] = 0.5;
        seed(
            &store,
            policy_doc(
                &format!("Doc {}", i),
                &format!("policy text number {} about schedules", i),
                None,
            ),
            Some(&embedding),
        )
        .await;
    }

    let embedder = CannedEmbedder::new().with_vector("schedules policy", vec![1.0, 0.0, 0.0, 0.0]);
    let engine = RetrievalEngine::new(store, embedder);

    for k in [1, 3, 5, 20] {
        let response = engine.search(&request("schedules policy", k)).await.unwrap();
        assert!(response.results.len() <= k);
        for hit in &response.results {
            assert!(
                (0.0..=1.0).contains(&hit.score),
                "score {} escaped [0, 1]",
                hit.score
            );
        }
    }
}

// ============================================================================
// Filtering and formatting
// ============================================================================

#[tokio::test]
async fn unknown_category_yields_empty_response_not_error() {
    let store = InMemoryCorpusStore::new();
    seed(
        &store,
        policy_doc("Doc", "content", Some("billing")),
        None,
    )
    .await;

    let engine = RetrievalEngine::new(store, DownEmbedder);
    let mut req = request("content", 5);
    req.category = Some("does-not-exist".to_string());
    let response = engine.search(&req).await.unwrap();

    assert!(response.results.is_empty());
    assert_eq!(response.mode, SearchMode::Bm25Only);
    assert_eq!(response.total_documents, 1);
}

#[tokio::test]
async fn snippets_are_truncated_with_marker_and_carry_provenance() {
    let store = InMemoryCorpusStore::new();
    let long_body = format!("overbooking compensation {}", "details ".repeat(100));
    store
        .add_document(Document {
            title: "Overbooking".to_string(),
            content: long_body,
            metadata: DocumentMetadata {
                category: Some("billing".to_string()),
                source: Some("ops-handbook.md".to_string()),
                chunk_index: Some(2),
                chunk_count: Some(7),
                ..Default::default()
            },
        })
        .await
        .unwrap();

    let engine = RetrievalEngine::new(store, DownEmbedder);
    let response = engine.search(&request("overbooking", 5)).await.unwrap();

    let hit = &response.results[0];
    assert!(hit.snippet.chars().count() <= 303);
    assert!(hit.snippet.ends_with("..."));
    assert_eq!(hit.source.as_deref(), Some("ops-handbook.md"));
    assert_eq!(hit.category.as_deref(), Some("billing"));
    assert_eq!(hit.chunk_index, Some(2));
    assert_eq!(hit.total_chunks, Some(7));
}

#[tokio::test]
async fn response_serializes_with_wire_mode_names() {
    let engine = RetrievalEngine::new(InMemoryCorpusStore::new(), DownEmbedder);
    let response = engine.search(&request("anything", 5)).await.unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["mode"], "no_data");
    assert_eq!(json["embeddings_available"], false);
    assert_eq!(json["total_documents"], 0);
    assert!(json["results"].as_array().unwrap().is_empty());
}
