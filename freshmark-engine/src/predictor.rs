use std::sync::Arc;

use serde::Deserialize;

use crate::features::ProductFeatures;

/// A fitted regression backend. Input layout is
/// `[inventory_left, shelf_life, days_left, avg_sales]`.
pub trait PriceModel: Send + Sync {
    fn predict(&self, input: &[f64; 4]) -> f64;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact has no layers")]
    EmptyMlp,
    #[error("model artifact has no trees")]
    EmptyForest,
    #[error("layer {layer} expects {expected} inputs, got {got}")]
    LayerShape {
        layer: usize,
        expected: usize,
        got: usize,
    },
    #[error("layer {layer} has {weights} weight rows but {biases} biases")]
    BiasShape {
        layer: usize,
        weights: usize,
        biases: usize,
    },
    #[error("tree {tree} references node {node}, but only {len} exist")]
    TreeIndex { tree: usize, node: usize, len: usize },
    #[error("tree {tree} splits on feature {feature}, input has 4")]
    TreeFeature { tree: usize, feature: usize },
    #[error("scaler scale must be non-zero for every feature")]
    ZeroScale,
}

/// Per-feature standardization fitted alongside one specific set of model
/// weights. Never shared across artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; 4],
    pub scale: [f64; 4],
}

impl StandardScaler {
    pub fn transform(&self, input: &[f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for i in 0..4 {
            out[i] = (input[i] - self.mean[i]) / self.scale[i];
        }
        out
    }
}

/// One dense layer, weights laid out `[outputs][inputs]`.
#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

/// Small feed-forward regressor: ReLU on hidden layers, identity output.
#[derive(Debug, Clone, Deserialize)]
pub struct MlpRegressor {
    pub layers: Vec<DenseLayer>,
}

impl PriceModel for MlpRegressor {
    fn predict(&self, input: &[f64; 4]) -> f64 {
        let mut activations: Vec<f64> = input.to_vec();
        let last = self.layers.len().saturating_sub(1);

        for (idx, layer) in self.layers.iter().enumerate() {
            let mut next = Vec::with_capacity(layer.biases.len());
            for (row, bias) in layer.weights.iter().zip(&layer.biases) {
                let mut sum = *bias;
                for (weight, activation) in row.iter().zip(&activations) {
                    sum += weight * activation;
                }
                next.push(if idx < last { sum.max(0.0) } else { sum });
            }
            activations = next;
        }

        activations.first().copied().unwrap_or(0.0)
    }
}

/// One node of a fitted regression tree, indexing into the tree's node
/// arena. Splits send `input <= threshold` left.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn predict(&self, input: &[f64; 4]) -> f64 {
        let mut idx = 0;
        // Validated trees are acyclic; the bound keeps a corrupt artifact
        // from spinning forever.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if input[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => return 0.0,
            }
        }
        0.0
    }
}

/// Tree ensemble regressor: mean of the member tree predictions.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestRegressor {
    pub trees: Vec<RegressionTree>,
}

impl PriceModel for ForestRegressor {
    fn predict(&self, input: &[f64; 4]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(input)).sum();
        total / self.trees.len() as f64
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelWeights {
    Mlp(MlpRegressor),
    Forest(ForestRegressor),
}

/// On-disk form of a fitted model: the weights and the scaler they were
/// trained with, as one unit.
#[derive(Debug, Deserialize)]
pub struct ModelArtifact {
    #[serde(flatten)]
    pub weights: ModelWeights,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

/// Wraps a loaded model and its paired normalization state. Candidate prices
/// come out rounded to cents.
pub struct PricePredictor {
    model: Arc<dyn PriceModel>,
    scaler: Option<StandardScaler>,
}

impl std::fmt::Debug for PricePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricePredictor")
            .field("scaler", &self.scaler)
            .finish_non_exhaustive()
    }
}

impl PricePredictor {
    pub fn new(model: Arc<dyn PriceModel>, scaler: Option<StandardScaler>) -> Self {
        Self { model, scaler }
    }

    /// Validate an artifact and turn it into a usable predictor. Any shape
    /// problem is a hard error; there is no degraded mode.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if let Some(scaler) = &artifact.scaler {
            if scaler.scale.iter().any(|s| *s == 0.0) {
                return Err(ModelError::ZeroScale);
            }
        }

        let model: Arc<dyn PriceModel> = match artifact.weights {
            ModelWeights::Mlp(mlp) => {
                validate_mlp(&mlp)?;
                Arc::new(mlp)
            }
            ModelWeights::Forest(forest) => {
                validate_forest(&forest)?;
                Arc::new(forest)
            }
        };
        Ok(Self::new(model, artifact.scaler))
    }

    /// Candidate price for one feature vector.
    pub fn predict(&self, features: &ProductFeatures) -> f64 {
        let input = features.as_input();
        let input = match &self.scaler {
            Some(scaler) => scaler.transform(&input),
            None => input,
        };
        round_to_cents(self.model.predict(&input))
    }
}

fn validate_mlp(mlp: &MlpRegressor) -> Result<(), ModelError> {
    if mlp.layers.is_empty() {
        return Err(ModelError::EmptyMlp);
    }
    let mut width = 4;
    for (idx, layer) in mlp.layers.iter().enumerate() {
        for row in &layer.weights {
            if row.len() != width {
                return Err(ModelError::LayerShape {
                    layer: idx,
                    expected: width,
                    got: row.len(),
                });
            }
        }
        if layer.weights.len() != layer.biases.len() {
            return Err(ModelError::BiasShape {
                layer: idx,
                weights: layer.weights.len(),
                biases: layer.biases.len(),
            });
        }
        width = layer.biases.len();
    }
    Ok(())
}

fn validate_forest(forest: &ForestRegressor) -> Result<(), ModelError> {
    if forest.trees.is_empty() {
        return Err(ModelError::EmptyForest);
    }
    for (tree_idx, tree) in forest.trees.iter().enumerate() {
        if tree.nodes.is_empty() {
            return Err(ModelError::TreeIndex {
                tree: tree_idx,
                node: 0,
                len: 0,
            });
        }
        for node in &tree.nodes {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= 4 {
                    return Err(ModelError::TreeFeature {
                        tree: tree_idx,
                        feature: *feature,
                    });
                }
                for child in [left, right] {
                    if *child >= tree.nodes.len() {
                        return Err(ModelError::TreeIndex {
                            tree: tree_idx,
                            node: *child,
                            len: tree.nodes.len(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
