#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;
use crate::frame::rgb_len;

/// Decoding parameters for YOLOv8-style detection heads.
#[derive(Clone, Debug)]
pub struct YoloParams {
    /// Square model input edge, in pixels.
    pub input_size: u32,
    /// Boxes scoring below this are dropped before the decision layer sees them.
    pub conf_threshold: f32,
    pub max_detections: usize,
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            max_detections: 300,
        }
    }
}

/// Tract-based backend for YOLOv8 ONNX exports.
///
/// The model is loaded and optimized once. Each call resizes the RGB frame to
/// the square model input and decodes the `[1, 4 + classes, anchors]` output
/// into per-anchor class and score. Boxes are not needed downstream, so no
/// NMS is applied.
pub struct TractBackend {
    model: TypedRunnableModel<TypedModel>,
    params: YoloParams,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, params: YoloParams) -> Result<Self> {
        let model_path = model_path.as_ref();
        let size = params.input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        log::info!(
            "TractBackend: loaded {} ({}x{} input)",
            model_path.display(),
            size,
            size
        );

        Ok(Self { model, params })
    }

    fn build_input(&self, pixels: &[u8], width: u32, height: u32) -> Result<Tensor> {
        let expected_len = rgb_len(width, height)?;
        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        let size = self.params.input_size;
        let source = RgbImage::from_raw(width, height, pixels.to_vec())
            .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", width, height))?;
        let resized = if width == size && height == size {
            source
        } else {
            imageops::resize(&source, size, size, FilterType::Triangle)
        };

        let size = size as usize;
        let input = tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });

        Ok(input.into_tensor())
    }

    fn decode(&self, outputs: TVec<TValue>) -> Result<Vec<Detection>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?
            .into_dimensionality::<tract_ndarray::Ix3>()
            .context("expected a [1, 4 + classes, anchors] output")?;
        decode_yolo(view, &self.params)
    }
}

/// Decode a `[1, 4 + classes, anchors]` YOLOv8 head into per-anchor class
/// and score, strongest first.
pub(crate) fn decode_yolo(
    view: tract_ndarray::ArrayView3<f32>,
    params: &YoloParams,
) -> Result<Vec<Detection>> {
    let (_, rows, anchors) = view.dim();
    if rows <= 4 {
        return Err(anyhow!("model output has no class rows ({} rows)", rows));
    }

    let mut detections = Vec::new();
    for anchor in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for class in 0..rows - 4 {
            let score = view[[0, 4 + class, anchor]];
            if score > best_score {
                best_score = score;
                best_class = class;
            }
        }
        if best_score.is_finite() && best_score >= params.conf_threshold {
            detections.push(Detection::new(best_class as u32, best_score.min(1.0)));
        }
    }

    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    detections.truncate(params.max_detections);
    Ok(detections)
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let input = self.build_input(pixels, width, height)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let detections = self.decode(outputs)?;
        log::debug!("TractBackend: {} boxes above pre-filter", detections.len());
        Ok(detections)
    }

    fn warm_up(&mut self) -> Result<()> {
        let size = self.params.input_size;
        let blank = vec![0u8; rgb_len(size, size)?];
        self.detect(&blank, size, size).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tract_ndarray::Array3;

    /// Build a `[1, 4 + classes, anchors]` head from per-anchor class scores.
    fn head(scores: &[&[f32]]) -> Array3<f32> {
        let classes = scores[0].len();
        Array3::from_shape_fn((1, 4 + classes, scores.len()), |(_, row, anchor)| {
            if row < 4 {
                10.0
            } else {
                scores[anchor][row - 4]
            }
        })
    }

    #[test]
    fn decode_keeps_argmax_class_above_prefilter() -> Result<()> {
        let output = head(&[
            &[0.82, 0.10, 0.05], // person
            &[0.20, 0.15, 0.10], // person, below pre-filter
            &[0.30, 0.91, 0.05], // bicycle wins argmax
            &[1.40, 0.00, 0.00], // unscaled score
        ]);

        let detections = decode_yolo(output.view(), &YoloParams::default())?;

        assert_eq!(
            detections,
            vec![
                Detection::new(0, 1.0),
                Detection::new(1, 0.91),
                Detection::new(0, 0.82),
            ]
        );
        Ok(())
    }

    #[test]
    fn decode_truncates_to_max_detections() -> Result<()> {
        let output = head(&[&[0.5, 0.0], &[0.9, 0.0], &[0.7, 0.0]]);
        let params = YoloParams {
            max_detections: 2,
            ..YoloParams::default()
        };

        let detections = decode_yolo(output.view(), &params)?;

        assert_eq!(
            detections,
            vec![Detection::new(0, 0.9), Detection::new(0, 0.7)]
        );
        Ok(())
    }

    #[test]
    fn decode_rejects_heads_without_class_rows() {
        let output = Array3::<f32>::zeros((1, 4, 8));

        let err = decode_yolo(output.view(), &YoloParams::default()).unwrap_err();

        assert!(err.to_string().contains("no class rows"));
    }
}
