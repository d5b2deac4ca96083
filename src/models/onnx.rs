//! ONNX Runtime backed churn classifier

use crate::error::{ArtifactError, PredictionError};
use crate::feature_encoder::{FeatureVector, FEATURE_COUNT};
use crate::models::ChurnModel;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

/// Loaded ONNX classifier with its input/output names.
///
/// Running a session needs `&mut`, so the session sits behind a lock.
pub struct OnnxChurnModel {
    name: String,
    session: RwLock<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxChurnModel {
    /// Load a classifier whose probability output is either a tensor or a
    /// `seq(map(int64, float))` (the scikit-learn ZipMap export).
    pub fn load<P: AsRef<Path>>(
        path: P,
        name: &str,
        threads: usize,
    ) -> Result<Self, ArtifactError> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(onnx_err(path))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(onnx_err(path))?
            .with_intra_threads(threads)
            .map_err(onnx_err(path))?
            .commit_from_file(path)
            .map_err(onnx_err(path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: RwLock::new(session),
            input_name,
            output_name,
        })
    }

    fn inference_error(&self, message: impl ToString) -> PredictionError {
        PredictionError::Inference {
            model: self.name.clone(),
            message: message.to_string(),
        }
    }
}

impl ChurnModel for OnnxChurnModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        // Shape [1, num_features]
        let shape = vec![1_i64, FEATURE_COUNT as i64];
        let input = Tensor::from_array((shape, features.to_f32_vec()))
            .map_err(|e| self.inference_error(e))?;

        let mut session = self
            .session
            .write()
            .map_err(|e| self.inference_error(format!("lock error: {e}")))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| self.inference_error(e))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| self.inference_error(format!("missing output {}", self.output_name)))?;

        // Tensor first (zipmap=False exports), then seq(map) (ZipMap exports)
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            let prob = positive_class_probability(&dims, data).ok_or_else(|| {
                self.inference_error(format!("unexpected output shape {dims:?}"))
            })?;
            debug!(model = %self.name, prob, "Extracted churn probability from tensor");
            return Ok(prob);
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            let prob = self.extract_from_sequence_map(output)?;
            debug!(model = %self.name, prob, "Extracted churn probability from seq(map)");
            return Ok(prob);
        }

        Err(self.inference_error(format!(
            "output {} is neither a probability tensor nor a seq(map)",
            self.output_name
        )))
    }
}

impl OnnxChurnModel {
    /// Read the class-1 probability from a `seq(map(int64, float))` output.
    fn extract_from_sequence_map(&self, output: &DynValue) -> Result<f64, PredictionError> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| self.inference_error(format!("failed to downcast to sequence: {e}")))?;
        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(|e| self.inference_error(e))?;

        // Batch size is always 1
        let map = maps
            .first()
            .ok_or_else(|| self.inference_error("empty probability sequence"))?;
        let pairs = map
            .try_extract_key_values::<i64, f32>()
            .map_err(|e| self.inference_error(e))?;

        class_one_probability(&pairs)
            .ok_or_else(|| self.inference_error("no class probability in output map"))
    }
}

fn onnx_err<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> ArtifactError + '_ {
    move |e| ArtifactError::Onnx {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Pick the positive-class probability from a `[1, 2]`, `[1, 1]`, `[2]` or
/// `[1]` probabilities tensor.
fn positive_class_probability(dims: &[i64], data: &[f32]) -> Option<f64> {
    let classes = match dims {
        [1, n] | [n] => *n,
        _ => return None,
    };
    match classes {
        1 => data.first().map(|&p| f64::from(p)),
        2 => data.get(1).map(|&p| f64::from(p)),
        _ => None,
    }
}

/// Churn probability from `(class, probability)` pairs: class 1 if present,
/// else the complement of class 0.
fn class_one_probability(pairs: &[(i64, f32)]) -> Option<f64> {
    if let Some(&(_, p)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Some(f64::from(p));
    }
    pairs
        .iter()
        .find(|(class, _)| *class == 0)
        .map(|&(_, p)| 1.0 - f64::from(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_class_from_two_class_output() {
        assert_eq!(positive_class_probability(&[1, 2], &[0.25, 0.75]), Some(0.75));
        assert_eq!(positive_class_probability(&[2], &[0.5, 0.5]), Some(0.5));
    }

    #[test]
    fn test_positive_class_from_single_output() {
        assert_eq!(positive_class_probability(&[1, 1], &[0.5]), Some(0.5));
    }

    #[test]
    fn test_class_one_from_zipmap_pairs() {
        assert_eq!(class_one_probability(&[(0, 0.25), (1, 0.75)]), Some(0.75));
        assert_eq!(class_one_probability(&[(1, 0.5), (0, 0.5)]), Some(0.5));
    }

    #[test]
    fn test_class_zero_only_is_complemented() {
        assert_eq!(class_one_probability(&[(0, 0.25)]), Some(0.75));
    }

    #[test]
    fn test_zipmap_without_binary_classes() {
        assert_eq!(class_one_probability(&[]), None);
        assert_eq!(class_one_probability(&[(2, 0.9)]), None);
    }

    #[test]
    fn test_unexpected_shapes() {
        assert_eq!(positive_class_probability(&[2, 2], &[0.1, 0.9, 0.2, 0.8]), None);
        assert_eq!(positive_class_probability(&[1, 3], &[0.1, 0.2, 0.7]), None);
        assert_eq!(positive_class_probability(&[1, 2], &[0.1]), None);
    }

    #[test]
    fn test_missing_model_file_is_artifact_error() {
        let err = OnnxChurnModel::load("/nonexistent/churn_model.onnx", "churn", 1)
            .err()
            .expect("loading a missing file must fail");
        assert!(err.to_string().contains("/nonexistent/churn_model.onnx"));
    }
}
