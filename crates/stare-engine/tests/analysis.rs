use std::sync::Arc;

use stare_ai::{Embedder, HashEmbedder};
use stare_core::{AnalysisConfig, PrecedentRecord};
use stare_engine::{AnalysisResponse, Analyzer, Query, Severity};
use stare_store::Corpus;

const DIM: usize = 64;

const MURDER_FACTS: &str = "The accused attacked his neighbour with an axe during a quarrel over \
                            a boundary wall and the neighbour died of his injuries.";

const QUERY: &str = "The accused struck the deceased with an axe after a quarrel over a boundary \
                     wall. He was charged under IPC 302 for murder.";

fn embed(text: &str) -> Vec<f32> {
    HashEmbedder::new(DIM).embed(text).unwrap()
}

fn record(
    id: &str,
    court: &str,
    year: i32,
    outcome: &str,
    ipc: &[&str],
    text: &str,
) -> PrecedentRecord {
    PrecedentRecord {
        id: id.into(),
        title: format!("State v. {id}"),
        court: court.into(),
        year,
        text: text.into(),
        ipc_sections: ipc.iter().map(|s| s.to_string()).collect(),
        outcome: outcome.into(),
        embedding: Some(embed(text)),
        ..Default::default()
    }
}

fn analyzer(records: Vec<PrecedentRecord>) -> Analyzer {
    let config = AnalysisConfig::default();
    let corpus = Corpus::from_records(records, &config.lexical).unwrap();
    Analyzer::new(config, corpus, Arc::new(HashEmbedder::new(DIM))).unwrap()
}

fn mixed_records() -> Vec<PrecedentRecord> {
    vec![
        record(
            "SC-2004-011",
            "Supreme Court of India",
            2004,
            "Convicted",
            &["302", "34"],
            MURDER_FACTS,
        ),
        record(
            "DHC-2018-207",
            "Delhi High Court",
            2018,
            "Acquitted",
            &["302"],
            "The prosecution failed to prove that the accused struck the deceased; the \
             eyewitnesses turned hostile and the axe was never recovered.",
        ),
        record(
            "BHC-2012-090",
            "Bombay High Court",
            2012,
            "Convicted",
            &["420", "468"],
            "The accused forged sale deeds and cheated buyers of agricultural land.",
        ),
        record(
            "MHC-2020-015",
            "Madras High Court",
            2020,
            "Bail Granted",
            &["379"],
            "Bail was granted to a first offender accused of stealing a motorcycle.",
        ),
    ]
}

fn assert_invariants(response: &AnalysisResponse) {
    for case in &response.similar_cases {
        let s = &case.scores;
        let expected = 0.5 * s.semantic + 0.3 * s.lexical + 0.2 * s.entity_overlap;
        assert!((s.hybrid() - expected).abs() < 1e-12);
        for v in [s.semantic, s.lexical, s.entity_overlap] {
            assert!((0.0..=1.0).contains(&v));
        }
    }
    for pair in response.similar_cases.windows(2) {
        let (a, b) = (&pair[0].scores, &pair[1].scores);
        assert!(a.hybrid() >= b.hybrid());
        if a.hybrid() == b.hybrid() {
            assert!(a.semantic >= b.semantic);
        }
    }
    let d = &response.ethical_flags.diversity_score;
    for v in [d.overall_score, d.court_diversity, d.temporal_diversity, d.outcome_diversity] {
        assert!((0.0..=1.0).contains(&v));
    }
    let ids: Vec<&str> = response.similar_cases.iter().map(|c| c.case_id.as_str()).collect();
    let explained: Vec<&str> = response.explanations.iter().map(|e| e.case_id.as_str()).collect();
    assert_eq!(ids, explained);
}

#[test]
fn full_pipeline_response() {
    let analyzer = analyzer(mixed_records());
    let response = analyzer.analyze(&Query::new(QUERY).with_top_k(4)).unwrap();
    assert_invariants(&response);

    assert_eq!(response.status, "success");
    assert_eq!(response.similar_cases.len(), 4);
    assert_eq!(response.query_info.top_k_requested, 4);
    assert_eq!(response.extracted_entities.ipc(), ["IPC 302"]);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["extracted_entities"]["IPC_Sections"][0], "IPC 302");
    let sc = json["similar_cases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["case_id"] == "SC-2004-011")
        .unwrap();
    assert_eq!(sc["ipc_sections"], "302, 34");
    assert_eq!(sc["judgment_outcome"], "Convicted");
    assert!(json["similar_cases"][0]["scores"]["hybrid"].is_number());
    assert!(json["ethical_flags"]["diversity_score"]["details"]["courts_represented"].is_array());
    assert!(json["disclaimer"].as_str().unwrap().contains("Judicial discretion remains paramount"));
}

#[test]
fn shared_section_ranks_above_unrelated() {
    let records = vec![
        record("A-1", "Delhi High Court", 2010, "Convicted", &["302"], MURDER_FACTS),
        record("A-2", "Patna High Court", 2014, "Convicted", &["302"], MURDER_FACTS),
        record("A-3", "Kerala High Court", 2016, "Acquitted", &["323"], MURDER_FACTS),
    ];
    let response = analyzer(records).analyze(&Query::new(QUERY)).unwrap();
    assert_invariants(&response);

    let ids: Vec<&str> = response.similar_cases.iter().map(|c| c.case_id.as_str()).collect();
    assert_eq!(ids, vec!["A-1", "A-2", "A-3"]);
    assert_eq!(response.similar_cases[0].scores.entity_overlap, 1.0);
    assert_eq!(response.similar_cases[1].scores.entity_overlap, 1.0);
    assert_eq!(response.similar_cases[2].scores.entity_overlap, 0.0);
}

#[test]
fn top_k_larger_than_corpus() {
    let records = mixed_records().into_iter().take(2).collect();
    let response = analyzer(records).analyze(&Query::new(QUERY).with_top_k(5)).unwrap();
    assert_eq!(response.similar_cases.len(), 2);
    assert_eq!(response.explanations.len(), 2);
}

struct PanickingEmbedder;

impl Embedder for PanickingEmbedder {
    fn dim(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "panicking"
    }

    fn embed_batch(&self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        panic!("scoring must not run for an invalid query");
    }
}

#[test]
fn short_query_rejected_before_scoring() {
    let config = AnalysisConfig::default();
    let corpus = Corpus::from_records(mixed_records(), &config.lexical).unwrap();
    let analyzer = Analyzer::new(config, corpus, Arc::new(PanickingEmbedder)).unwrap();

    let err = analyzer.analyze(&Query::new("IPC 302 ab")).unwrap_err();
    assert_eq!(err.kind(), "invalid_query");
    assert_eq!(err.http_status(), 400);

    let err = analyzer.analyze(&Query::new(QUERY).with_top_k(0)).unwrap_err();
    assert_eq!(err.kind(), "invalid_query");
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn embed_batch(&self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("model session crashed")
    }
}

#[test]
fn embedder_error_fails_request() {
    let config = AnalysisConfig::default();
    let corpus = Corpus::from_records(mixed_records(), &config.lexical).unwrap();
    let analyzer = Analyzer::new(config, corpus, Arc::new(FailingEmbedder)).unwrap();
    let err = analyzer.analyze(&Query::new(QUERY)).unwrap_err();
    assert_eq!(err.kind(), "embedding_failure");
    assert_eq!(err.to_body().http_status, 502);
    assert!(err.reason().contains("model session crashed"));
}

#[test]
fn single_court_set_flagged() {
    let records = (0..10)
        .map(|i| {
            record(
                &format!("DHC-{i:02}"),
                "Delhi High Court",
                2000 + i,
                if i % 2 == 0 { "Convicted" } else { "Acquitted" },
                &["302"],
                MURDER_FACTS,
            )
        })
        .collect();
    let response = analyzer(records)
        .analyze(&Query::new(QUERY).with_top_k(10))
        .unwrap();
    assert_invariants(&response);

    let flags = &response.ethical_flags;
    assert!(flags.diversity_score.court_diversity <= 0.1);
    let warning = flags
        .bias_warnings
        .iter()
        .find(|w| w.code == "single_court_dominance")
        .unwrap();
    assert_eq!(warning.severity, Severity::Medium);
    assert!(warning.message.starts_with("10 of 10 precedents are from Delhi High Court"));
}

#[test]
fn repeated_analysis_is_identical() {
    let analyzer = analyzer(mixed_records());
    let query = Query::new(QUERY).with_top_k(3);
    let first = serde_json::to_string(&analyzer.analyze(&query).unwrap()).unwrap();
    let second = serde_json::to_string(&analyzer.analyze(&query).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn ties_follow_id_order_regardless_of_load_order() {
    let records: Vec<PrecedentRecord> = ["T-3", "T-1", "T-2"]
        .iter()
        .map(|id| record(id, "Supreme Court of India", 2015, "Convicted", &["302"], MURDER_FACTS))
        .collect();
    let mut reversed = records.clone();
    reversed.reverse();

    let ids = |records: Vec<PrecedentRecord>| -> Vec<String> {
        analyzer(records)
            .analyze(&Query::new(QUERY))
            .unwrap()
            .similar_cases
            .into_iter()
            .map(|c| c.case_id)
            .collect()
    };
    assert_eq!(ids(records), vec!["T-1", "T-2", "T-3"]);
    assert_eq!(ids(reversed), vec!["T-1", "T-2", "T-3"]);
}

#[test]
fn empty_query_entities_give_zero_overlap() {
    let response = analyzer(mixed_records())
        .analyze(&Query::new("A quarrel over a boundary wall ended with an axe attack."))
        .unwrap();
    assert!(response.extracted_entities.is_empty());
    assert!(response.similar_cases.iter().all(|c| c.scores.entity_overlap == 0.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_snapshot() {
    let analyzer = Arc::new(analyzer(mixed_records()));
    let expected = serde_json::to_string(&analyzer.analyze(&Query::new(QUERY)).unwrap()).unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let analyzer = Arc::clone(&analyzer);
        handles.push(tokio::task::spawn_blocking(move || {
            let response = analyzer.analyze(&Query::new(QUERY)).unwrap();
            serde_json::to_string(&response).unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), expected);
    }
}

#[test]
fn swap_leaves_held_snapshot_intact() {
    let analyzer = analyzer(mixed_records());
    let before = analyzer.snapshot();

    let config = AnalysisConfig::default();
    let first = mixed_records().into_iter().take(1).collect();
    let smaller = Corpus::from_records(first, &config.lexical).unwrap();
    analyzer.swap_corpus(smaller).unwrap();

    assert_eq!(before.len(), 4);
    assert_eq!(analyzer.snapshot().len(), 1);
    let response = analyzer.analyze(&Query::new(QUERY)).unwrap();
    assert_eq!(response.similar_cases.len(), 1);
}
