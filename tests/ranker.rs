//! End-to-end tests for the LightGBM ranking adapter.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use ndarray::array;

use craftrank::{Error, LightGbmRanker, MatchScore, QueryMeta, RankerParams};

use common::{assert_close, match_meta, write_model};

fn ranker(dir: &tempfile::TempDir) -> LightGbmRanker {
    LightGbmRanker::new(&RankerParams::new(write_model(dir), &["f1", "f2"])).unwrap()
}

fn score(ranker: &LightGbmRanker, rows: &[(i64, f64, f64)]) -> craftrank::Result<Vec<MatchScore>> {
    ranker.score(&QueryMeta::new(), &HashMap::new(), &match_meta(rows))
}

#[test]
fn declares_tagged_required_keys() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ranker(&dir).required_keys(), vec!["tag_f1", "tag_f2"]);
}

#[test]
fn assembles_rows_in_iteration_order() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = ranker(&dir)
        .features_dataset(&match_meta(&[(0, 1.0, 2.0), (1, 3.0, 4.0)]))
        .unwrap();
    assert_eq!(dataset, array![[1.0, 2.0], [3.0, 4.0]]);
}

#[test]
fn scores_contiguous_ids() {
    let dir = tempfile::tempdir().unwrap();
    let scores = score(&ranker(&dir), &[(0, 1.0, 2.0), (1, 3.0, 4.0)]).unwrap();

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].match_id, 0);
    assert_close(scores[0].score, 0.15);
    assert_eq!(scores[1].match_id, 1);
    assert_close(scores[1].score, 0.35);
}

#[test]
fn scores_are_paired_by_position_for_arbitrary_ids() {
    let dir = tempfile::tempdir().unwrap();
    let scores = score(
        &ranker(&dir),
        &[(5, 3.0, 4.0), (2, 1.0, 9.0), (9_000_000_001, 3.0, 1.0)],
    )
    .unwrap();

    let ids: Vec<i64> = scores.iter().map(|s| s.match_id).collect();
    assert_eq!(ids, vec![5, 2, 9_000_000_001]);
    assert_close(scores[0].score, 0.35);
    assert_close(scores[1].score, 0.15);
    assert_close(scores[2].score, 0.25);
}

#[test]
fn repeated_scoring_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let ranker = ranker(&dir);
    let rows = [(0, 1.0, 2.0), (1, 3.0, 4.0), (2, 2.6, 1.4)];

    let first = score(&ranker, &rows).unwrap();
    let second = score(&ranker, &rows).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_feature_fails_the_whole_call() {
    let dir = tempfile::tempdir().unwrap();
    let ranker = ranker(&dir);
    let mut meta = match_meta(&[(0, 1.0, 2.0), (1, 3.0, 4.0)]);
    meta.insert(2, HashMap::from([("f2".to_string(), 1.0)]));

    match ranker.score(&QueryMeta::new(), &HashMap::new(), &meta) {
        Err(Error::MissingFeature { match_id, feature }) => {
            assert_eq!(match_id, 2);
            assert_eq!(feature, "f1");
        }
        other => panic!("expected MissingFeature, got {:?}", other),
    }
}

#[test]
fn nonexistent_model_path_fails_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");

    let err = LightGbmRanker::new(&RankerParams::new(&missing, &["f1", "f2"])).unwrap_err();
    match &err {
        Error::PretrainedModelMissing { path } => assert_eq!(path.as_deref(), Some(missing.as_path())),
        other => panic!("expected PretrainedModelMissing, got {:?}", other),
    }
    assert!(err.is_setup_error());
    assert!(err.to_string().contains("nope.txt"));
}

#[test]
fn malformed_model_fails_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.txt");
    std::fs::write(&path, "this is not a model\n").unwrap();

    let err = LightGbmRanker::new(&RankerParams::new(&path, &["f1"])).unwrap_err();
    assert!(matches!(err, Error::ModelFormat { .. }));
}

#[test]
fn too_few_features_fail_per_call() {
    let dir = tempfile::tempdir().unwrap();
    let ranker = LightGbmRanker::new(&RankerParams::new(write_model(&dir), &["f1"])).unwrap();

    let err = score(&ranker, &[(0, 1.0, 2.0)]).unwrap_err();
    assert!(matches!(err, Error::FeatureCountMismatch { expected: 2, got: 1 }));
}

#[test]
fn shared_ranker_scores_from_many_threads() {
    let dir = tempfile::tempdir().unwrap();
    let ranker = Arc::new(ranker(&dir));
    let rows = [(0, 1.0, 2.0), (1, 3.0, 4.0), (2, 3.0, 1.0)];
    let expected = score(&ranker, &rows).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ranker = Arc::clone(&ranker);
                s.spawn(move || score(&ranker, &rows).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn params_load_from_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(&dir);
    let config = dir.path().join("ranker.json");
    std::fs::write(
        &config,
        serde_json::json!({ "model_path": model, "feature_names": ["f1", "f2"] }).to_string(),
    )
    .unwrap();

    let params = RankerParams::from_json_file(&config).unwrap();
    let ranker = LightGbmRanker::new(&params).unwrap();
    assert_eq!(ranker.feature_names(), &["f1".to_string(), "f2".to_string()]);
}
