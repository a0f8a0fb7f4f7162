use ranklab_core::persist::{load_judgments, load_run, write_run};
use ranklab_core::rank::{Run, RunEntry, ScoredDoc};
use std::fs;
use tempfile::tempdir;

fn sample_run() -> Run {
    Run {
        tag: "BM25".into(),
        entries: vec![
            RunEntry {
                query_id: "q1".into(),
                ranking: vec![
                    ScoredDoc { doc_id: "docA".into(), score: 1.25 },
                    ScoredDoc { doc_id: "doc with spaces".into(), score: 0.5 },
                ],
            },
            RunEntry {
                query_id: "q2".into(),
                ranking: vec![ScoredDoc { doc_id: "docB".into(), score: -3.125 }],
            },
        ],
    }
}

#[test]
fn run_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.run");
    let run = sample_run();
    write_run(&path, &run).unwrap();

    let loaded = load_run(&path).unwrap();
    assert_eq!(loaded.tag, "BM25");
    assert_eq!(loaded.entries.len(), 2);
    assert_eq!(loaded.entries[0].query_id, "q1");
    let ids: Vec<&str> = loaded.entries[0].ranking.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["docA", "doc with spaces"]);
    // Scores survive up to the serialized 6-decimal precision.
    for (orig, back) in run.entries[0].ranking.iter().zip(&loaded.entries[0].ranking) {
        assert!((orig.score - back.score).abs() < 1e-6);
    }
}

#[test]
fn run_file_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.run");
    write_run(&path, &sample_run()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let first = text.lines().next().unwrap();
    assert_eq!(first, "q1 Q0 docA 1 1.250000 BM25");
}

#[test]
fn malformed_run_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("noisy.run");
    fs::write(
        &path,
        "q1 Q0 docA 1 1.000000 tag\n\
         too few fields\n\
         q1 XX docB 2 0.900000 tag\n\
         q1 Q0 docC bad 0.800000 tag\n\
         q1 Q0 docD 2 0.700000 tag\n",
    )
    .unwrap();
    let run = load_run(&path).unwrap();
    assert_eq!(run.entries.len(), 1);
    let ids: Vec<&str> = run.entries[0].ranking.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["docA", "docD"]);
}

#[test]
fn run_lines_out_of_rank_order_are_reordered() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shuffled.run");
    fs::write(
        &path,
        "q1 Q0 second 2 0.500000 tag\n\
         q1 Q0 first 1 0.900000 tag\n",
    )
    .unwrap();
    let run = load_run(&path).unwrap();
    let ids: Vec<&str> = run.entries[0].ranking.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[test]
fn judgments_parse_and_skip_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("qrels.txt");
    fs::write(
        &path,
        "q1 0 docA 1\n\
         q1 0 docB 0\n\
         q1 0 docC 2\n\
         garbage line\n\
         q2 0 docA not_a_number\n\
         q2 0 docD 1\n",
    )
    .unwrap();
    let judgments = load_judgments(&path).unwrap();
    assert_eq!(judgments.len(), 2);
    assert_eq!(judgments["q1"]["docC"], 2);
    assert_eq!(judgments["q1"]["docB"], 0);
    assert_eq!(judgments["q2"].len(), 1);
}
