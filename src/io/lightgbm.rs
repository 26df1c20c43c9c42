//! Reader and evaluator for LightGBM text models (the `save_model` format).
//!
//! Only what prediction needs is read: the header (`max_feature_idx`,
//! `objective`, `feature_names`, `num_tree_per_iteration`, `average_output`)
//! and each `Tree=N` block's split, leaf and linear-leaf arrays. Everything
//! after `end of trees` (importances, parameters) is ignored.
//!
//! Decision rules follow LightGBM's `Tree::NumericalDecision` and
//! `Tree::CategoricalDecision`, and the objective's output conversion is
//! applied as `predict` does by default. Objectives without a known
//! conversion are rejected at load time.
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use ndarray::{Array1, ArrayView1, ArrayView2, Zip};
use tracing::{debug, info};

use crate::core::booster::Booster;
use crate::error::{Error, Result};

const CATEGORICAL_MASK: u8 = 1;
const DEFAULT_LEFT_MASK: u8 = 2;
const ZERO_THRESHOLD: f64 = 1e-35;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum MissingType {
    None,
    Zero,
    NaN,
}

impl MissingType {
    fn from_decision_type(decision_type: u8) -> Self {
        match (decision_type >> 2) & 3 {
            1 => MissingType::Zero,
            2 => MissingType::NaN,
            _ => MissingType::None,
        }
    }
}

fn is_zero(fval: f64) -> bool {
    (-ZERO_THRESHOLD..=ZERO_THRESHOLD).contains(&fval)
}

/// Transform applied to the raw ensemble sum.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum OutputTransform {
    Identity,
    /// `1 / (1 + exp(-k * x))`
    Sigmoid(f64),
    /// `exp(x)`, for the log-link objectives.
    Exp,
    /// `sign(x) * x^2`, for regression trained on `sqrt` labels.
    SignedSquare,
    /// `log(1 + exp(x))`
    Log1pExp,
}

impl OutputTransform {
    fn from_objective(objective: &str) -> Result<Self> {
        let mut tokens = objective.split_whitespace();
        let name = tokens.next().unwrap_or("");
        let has_sqrt = objective.split_whitespace().any(|t| t == "sqrt");
        let transform = match name {
            "binary" => {
                let sigmoid = tokens
                    .find_map(|t| t.strip_prefix("sigmoid:"))
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(1.0);
                OutputTransform::Sigmoid(sigmoid)
            }
            "cross_entropy" | "xentropy" => OutputTransform::Sigmoid(1.0),
            "cross_entropy_lambda" | "xentlambda" => OutputTransform::Log1pExp,
            "poisson" | "gamma" | "tweedie" => OutputTransform::Exp,
            "regression" | "regression_l1" | "huber" | "fair" | "quantile" | "mape" if has_sqrt => {
                OutputTransform::SignedSquare
            }
            "regression" | "regression_l1" | "huber" | "fair" | "quantile" | "mape"
            | "lambdarank" | "rank_xendcg" | "" => OutputTransform::Identity,
            other => {
                return Err(Error::UnsupportedModel(format!(
                    "objective '{}' has no known output conversion",
                    other
                )));
            }
        };
        Ok(transform)
    }

    fn apply(self, raw: f64) -> f64 {
        match self {
            OutputTransform::Identity => raw,
            OutputTransform::Sigmoid(k) => 1.0 / (1.0 + (-k * raw).exp()),
            OutputTransform::Exp => raw.exp(),
            OutputTransform::SignedSquare => raw.signum() * raw * raw,
            OutputTransform::Log1pExp => raw.exp().ln_1p(),
        }
    }
}

/// Per-leaf linear model of a `linear_tree` booster.
#[derive(Debug, Clone)]
struct LinearLeaf {
    constant: f64,
    features: Vec<usize>,
    coeffs: Vec<f64>,
}

impl LinearLeaf {
    // None when a referenced feature is NaN; the caller then uses the plain leaf value.
    fn output(&self, row: ArrayView1<'_, f64>) -> Option<f64> {
        let mut out = self.constant;
        for (&feature, &coeff) in self.features.iter().zip(&self.coeffs) {
            let value = row[feature];
            if value.is_nan() {
                return None;
            }
            out += coeff * value;
        }
        Some(out)
    }
}

#[derive(Debug, Clone)]
struct Tree {
    split_feature: Vec<usize>,
    threshold: Vec<f64>,
    decision_type: Vec<u8>,
    left_child: Vec<i32>,
    right_child: Vec<i32>,
    leaf_value: Vec<f64>,
    cat_boundaries: Vec<usize>,
    cat_threshold: Vec<u32>,
    /// One entry per leaf when the tree is linear, empty otherwise.
    linear: Vec<LinearLeaf>,
}

type Fields<'a> = HashMap<&'a str, &'a str>;

fn field<'a>(fields: &Fields<'a>, key: &str, line: usize) -> Result<&'a str> {
    fields
        .get(key)
        .copied()
        .ok_or_else(|| Error::model_format(line, format!("missing '{}'", key)))
}

fn parse_scalar<T: FromStr>(value: &str, key: &str, line: usize) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::model_format(line, format!("invalid {} value '{}'", key, value)))
}

fn parse_values<T: FromStr>(value: &str, key: &str, line: usize) -> Result<Vec<T>> {
    value
        .split_whitespace()
        .map(|v| parse_scalar(v, key, line))
        .collect()
}

fn parse_list<T: FromStr>(fields: &Fields<'_>, key: &str, line: usize, len: usize) -> Result<Vec<T>> {
    let values: Vec<T> = parse_values(field(fields, key, line)?, key, line)?;
    if values.len() != len {
        return Err(Error::model_format(
            line,
            format!("'{}' has {} entries, expected {}", key, values.len(), len),
        ));
    }
    Ok(values)
}

impl Tree {
    fn from_fields(fields: &Fields<'_>, line: usize) -> Result<Self> {
        let num_leaves: usize = parse_scalar(field(fields, "num_leaves", line)?, "num_leaves", line)?;
        if num_leaves == 0 {
            return Err(Error::model_format(line, "tree has no leaves"));
        }
        let leaf_value = parse_list(fields, "leaf_value", line, num_leaves)?;
        let linear = Self::linear_leaves(fields, line, num_leaves)?;

        if num_leaves == 1 {
            return Ok(Tree {
                split_feature: Vec::new(),
                threshold: Vec::new(),
                decision_type: Vec::new(),
                left_child: Vec::new(),
                right_child: Vec::new(),
                leaf_value,
                cat_boundaries: Vec::new(),
                cat_threshold: Vec::new(),
                linear,
            });
        }

        let internal = num_leaves - 1;
        let decision_type = if fields.contains_key("decision_type") {
            parse_list(fields, "decision_type", line, internal)?
        } else {
            vec![0; internal]
        };
        let num_cat: usize = match fields.get("num_cat") {
            Some(v) => parse_scalar(v, "num_cat", line)?,
            None => 0,
        };
        let (cat_boundaries, cat_threshold) = if num_cat > 0 {
            let boundaries: Vec<usize> = parse_list(fields, "cat_boundaries", line, num_cat + 1)?;
            let bitset: Vec<u32> = parse_values(field(fields, "cat_threshold", line)?, "cat_threshold", line)?;
            if boundaries.windows(2).any(|w| w[0] > w[1])
                || boundaries.last().is_some_and(|&end| end > bitset.len())
            {
                return Err(Error::model_format(line, "cat_boundaries out of range"));
            }
            (boundaries, bitset)
        } else {
            (Vec::new(), Vec::new())
        };

        let tree = Tree {
            split_feature: parse_list(fields, "split_feature", line, internal)?,
            threshold: parse_list(fields, "threshold", line, internal)?,
            decision_type,
            left_child: parse_list(fields, "left_child", line, internal)?,
            right_child: parse_list(fields, "right_child", line, internal)?,
            leaf_value,
            cat_boundaries,
            cat_threshold,
            linear,
        };
        tree.validate(num_cat, line)?;
        Ok(tree)
    }

    // `leaf_features` and `leaf_coeff` are flattened across leaves;
    // `num_features` gives each leaf's share.
    fn linear_leaves(fields: &Fields<'_>, line: usize, num_leaves: usize) -> Result<Vec<LinearLeaf>> {
        let is_linear: u8 = match fields.get("is_linear") {
            Some(v) => parse_scalar(v, "is_linear", line)?,
            None => 0,
        };
        if is_linear == 0 {
            return Ok(Vec::new());
        }

        let constants: Vec<f64> = parse_list(fields, "leaf_const", line, num_leaves)?;
        let features: Vec<usize> =
            parse_values(fields.get("leaf_features").copied().unwrap_or(""), "leaf_features", line)?;
        let coeffs: Vec<f64> =
            parse_values(fields.get("leaf_coeff").copied().unwrap_or(""), "leaf_coeff", line)?;
        let counts: Vec<usize> = if fields.contains_key("num_features") {
            parse_list(fields, "num_features", line, num_leaves)?
        } else if num_leaves == 1 {
            vec![features.len()]
        } else {
            return Err(Error::model_format(line, "linear tree without 'num_features'"));
        };

        let total: usize = counts.iter().sum();
        if features.len() != total || coeffs.len() != total {
            return Err(Error::model_format(
                line,
                format!(
                    "linear leaves declare {} features but list {} features and {} coefficients",
                    total,
                    features.len(),
                    coeffs.len()
                ),
            ));
        }

        let mut start = 0;
        Ok(constants
            .into_iter()
            .zip(counts)
            .map(|(constant, count)| {
                let end = start + count;
                let leaf = LinearLeaf {
                    constant,
                    features: features[start..end].to_vec(),
                    coeffs: coeffs[start..end].to_vec(),
                };
                start = end;
                leaf
            })
            .collect())
    }

    // Children of a node always come after it, which also rules out cycles.
    fn validate(&self, num_cat: usize, line: usize) -> Result<()> {
        let internal = self.split_feature.len();
        let leaves = self.leaf_value.len();
        for node in 0..internal {
            for child in [self.left_child[node], self.right_child[node]] {
                let ok = if child >= 0 {
                    (child as usize) > node && (child as usize) < internal
                } else {
                    ((!child) as usize) < leaves
                };
                if !ok {
                    return Err(Error::model_format(
                        line,
                        format!("node {} has invalid child {}", node, child),
                    ));
                }
            }
            if self.decision_type[node] & CATEGORICAL_MASK != 0 {
                let cat_idx = self.threshold[node];
                if !(cat_idx >= 0.0 && (cat_idx as usize) < num_cat) {
                    return Err(Error::model_format(
                        line,
                        format!("node {} has invalid category index {}", node, cat_idx),
                    ));
                }
            }
        }
        Ok(())
    }

    fn max_feature_used(&self) -> Option<usize> {
        let linear = self.linear.iter().flat_map(|leaf| leaf.features.iter());
        self.split_feature.iter().chain(linear).copied().max()
    }

    fn numerical_decision(&self, mut fval: f64, node: usize) -> i32 {
        let decision_type = self.decision_type[node];
        let missing_type = MissingType::from_decision_type(decision_type);
        if fval.is_nan() && missing_type != MissingType::NaN {
            fval = 0.0;
        }
        if (missing_type == MissingType::Zero && is_zero(fval))
            || (missing_type == MissingType::NaN && fval.is_nan())
        {
            return if decision_type & DEFAULT_LEFT_MASK != 0 {
                self.left_child[node]
            } else {
                self.right_child[node]
            };
        }
        if fval <= self.threshold[node] {
            self.left_child[node]
        } else {
            self.right_child[node]
        }
    }

    fn categorical_decision(&self, fval: f64, node: usize) -> i32 {
        // Truncation toward zero: -0.5 is category 0.
        let category = fval as i64;
        if fval.is_nan() || category < 0 {
            return self.right_child[node];
        }
        let category = category as usize;
        let cat_idx = self.threshold[node] as usize;
        let start = self.cat_boundaries[cat_idx];
        let end = self.cat_boundaries[cat_idx + 1];
        let word = category / 32;
        let hit = word < end - start && (self.cat_threshold[start + word] >> (category % 32)) & 1 == 1;
        if hit {
            self.left_child[node]
        } else {
            self.right_child[node]
        }
    }

    fn leaf_index(&self, row: ArrayView1<'_, f64>) -> usize {
        if self.split_feature.is_empty() {
            return 0;
        }
        let mut node: i32 = 0;
        while node >= 0 {
            let n = node as usize;
            let fval = row[self.split_feature[n]];
            node = if self.decision_type[n] & CATEGORICAL_MASK != 0 {
                self.categorical_decision(fval, n)
            } else {
                self.numerical_decision(fval, n)
            };
        }
        (!node) as usize
    }

    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let leaf = self.leaf_index(row);
        self.linear
            .get(leaf)
            .and_then(|linear| linear.output(row))
            .unwrap_or(self.leaf_value[leaf])
    }
}

/// A LightGBM tree ensemble with a single output per row.
#[derive(Debug, Clone)]
pub struct LightGbmModel {
    trees: Vec<Tree>,
    num_features: usize,
    feature_names: Vec<String>,
    objective: String,
    transform: OutputTransform,
    average_output: bool,
}

impl LightGbmModel {
    /// Load a model saved with LightGBM's `save_model`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let model: LightGbmModel = text.parse()?;
        info!(
            "Loaded LightGBM model {:?}: {} trees, {} features, objective '{}'",
            path,
            model.trees.len(),
            model.num_features,
            model.objective
        );
        Ok(model)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn transform(&self) -> OutputTransform {
        self.transform
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut raw: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        if self.average_output {
            raw /= self.trees.len() as f64;
        }
        self.transform.apply(raw)
    }
}

impl FromStr for LightGbmModel {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut header: Fields<'_> = HashMap::new();
        let mut average_output = false;
        let mut blocks: Vec<(usize, Fields<'_>)> = Vec::new();
        let mut seen_magic = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if !seen_magic {
                if line != "tree" {
                    return Err(Error::model_format(line_no, "expected 'tree' header"));
                }
                seen_magic = true;
                continue;
            }
            if line == "end of trees" {
                break;
            }
            if line.starts_with("Tree=") {
                blocks.push((line_no, HashMap::new()));
                continue;
            }
            match (line.split_once('='), blocks.last_mut()) {
                (Some((key, value)), Some((_, fields))) => {
                    fields.insert(key, value);
                }
                (Some((key, value)), None) => {
                    header.insert(key, value);
                }
                (None, None) if line == "average_output" => average_output = true,
                (None, _) => {}
            }
        }

        if !seen_magic {
            return Err(Error::model_format(1, "empty model text"));
        }

        let per_iteration: usize = match header.get("num_tree_per_iteration") {
            Some(v) => parse_scalar(v, "num_tree_per_iteration", 1)?,
            None => 1,
        };
        if per_iteration != 1 {
            return Err(Error::UnsupportedModel(format!(
                "{} trees per iteration; only single-output models can score matches",
                per_iteration
            )));
        }

        let max_feature_idx: usize =
            parse_scalar(field(&header, "max_feature_idx", 1)?, "max_feature_idx", 1)?;
        let num_features = max_feature_idx + 1;
        let feature_names = header
            .get("feature_names")
            .map(|names| names.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let objective = header.get("objective").copied().unwrap_or("").trim().to_string();
        let transform = OutputTransform::from_objective(&objective)?;

        let trees = blocks
            .iter()
            .map(|(line, fields)| Tree::from_fields(fields, *line))
            .collect::<Result<Vec<_>>>()?;
        if trees.is_empty() {
            return Err(Error::model_format(1, "model contains no trees"));
        }
        for ((line, _), tree) in blocks.iter().zip(&trees) {
            if let Some(feature) = tree.max_feature_used().filter(|&f| f >= num_features) {
                return Err(Error::model_format(
                    *line,
                    format!("uses feature {} beyond max_feature_idx {}", feature, max_feature_idx),
                ));
            }
        }

        debug!(
            "Parsed {} trees (average_output={}, transform={:?})",
            trees.len(),
            average_output,
            transform
        );

        Ok(LightGbmModel {
            trees,
            num_features,
            feature_names,
            objective,
            transform,
            average_output,
        })
    }
}

impl Booster for LightGbmModel {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if features.ncols() < self.num_features {
            return Err(Error::FeatureCountMismatch {
                expected: self.num_features,
                got: features.ncols(),
            });
        }
        let mut scores = Array1::<f64>::zeros(features.nrows());
        Zip::from(&mut scores)
            .and(features.rows())
            .par_for_each(|score, row| *score = self.predict_row(row));
        Ok(scores)
    }

    fn feature_names(&self) -> Option<&[String]> {
        if self.feature_names.is_empty() {
            None
        } else {
            Some(&self.feature_names)
        }
    }
}
