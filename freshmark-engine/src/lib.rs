pub mod decision;
pub mod features;
pub mod pipeline;
pub mod predictor;
pub mod trigger;

pub use decision::Guardrail;
pub use features::{DaysLeftMode, FeatureBuilder, FeatureSet, ProductFeatures};
pub use pipeline::{PipelineMode, PricingPipeline};
pub use predictor::{ModelArtifact, ModelError, PriceModel, PricePredictor};
pub use trigger::{BatchTriggerPolicy, LiveStrategy, LiveTriggerPolicy, TriggerDecision};
