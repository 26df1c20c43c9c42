//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use craftrank::{MatchId, MatchMeta};

/// A two-feature lambdarank model as written by LightGBM's `save_model`.
///
/// Tree 0 splits on `f1 <= 2.5`, then on `f2 <= 1.5`; tree 1 is a constant.
/// Scores: f1 <= 2.5 -> 0.15; else f2 <= 1.5 -> 0.25; else 0.35.
pub const RANKING_MODEL: &str = "tree
version=v3
num_class=1
num_tree_per_iteration=1
label_index=0
max_feature_idx=1
objective=lambdarank
feature_names=f1 f2
feature_infos=[0:10] [0:10]
tree_sizes=398 220

Tree=0
num_leaves=3
num_cat=0
split_feature=0 1
split_gain=12.5 3.25
threshold=2.5000000000000004 1.5000000000000002
decision_type=2 2
left_child=-1 -2
right_child=1 -3
leaf_value=0.10000000000000001 0.20000000000000001 0.29999999999999999
leaf_weight=4 2 2
leaf_count=4 2 2
internal_value=0 0.25
internal_weight=0 4
internal_count=8 4
is_linear=0
shrinkage=1


Tree=1
num_leaves=1
num_cat=0
split_feature=
split_gain=
threshold=
decision_type=
left_child=
right_child=
leaf_value=0.050000000000000003
leaf_weight=
leaf_count=
internal_value=
internal_weight=
internal_count=
is_linear=0
shrinkage=1


end of trees

feature_importances:
f1=1
f2=1

parameters:
[boosting: gbdt]
[objective: lambdarank]
[num_iterations: 2]
end of parameters

pandas_categorical:null
";

pub fn write_model(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("ltr_model.txt");
    std::fs::write(&path, RANKING_MODEL).unwrap();
    path
}

pub fn match_meta(rows: &[(MatchId, f64, f64)]) -> MatchMeta {
    rows.iter()
        .map(|&(id, f1, f2)| {
            let values: HashMap<String, f64> =
                [("f1".to_string(), f1), ("f2".to_string(), f2)].into_iter().collect();
            (id, values)
        })
        .collect()
}

pub fn assert_close(got: f64, want: f64) {
    assert!((got - want).abs() < 1e-9, "{got} != {want}");
}
