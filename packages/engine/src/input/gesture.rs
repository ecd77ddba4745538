//! Hand-pose classification
//!
//! Landmarks follow the usual 21-point hand layout with coordinates
//! normalised to `[0, 1]` and `y` growing downward. A hand is "cutting" when
//! the index and middle fingers are both extended (tip above its distal
//! joint) and their tips are level with each other.

use serde::{Deserialize, Serialize};

use crate::core::{SimError, SimResult};
use crate::domain::Vec2;

pub const LANDMARK_COUNT: usize = 21;

const INDEX_DIP: usize = 7;
const INDEX_TIP: usize = 8;
const MIDDLE_DIP: usize = 11;
const MIDDLE_TIP: usize = 12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn from_slice(points: &[Landmark]) -> SimResult<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().map_err(|_| {
            SimError::InvalidLandmarks(format!("expected {LANDMARK_COUNT} landmarks, got {}", points.len()))
        })?;
        Ok(Self::new(points))
    }

    /// Packed coordinates as sent from JS: `x, y` or `x, y, z` per landmark.
    pub fn from_flat(coords: &[f32]) -> SimResult<Self> {
        let stride = match coords.len() {
            n if n == LANDMARK_COUNT * 3 => 3,
            n if n == LANDMARK_COUNT * 2 => 2,
            n => {
                return Err(SimError::InvalidLandmarks(format!(
                    "expected {} or {} floats, got {n}",
                    LANDMARK_COUNT * 2,
                    LANDMARK_COUNT * 3
                )))
            }
        };
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(SimError::InvalidLandmarks("non-finite coordinate".into()));
        }

        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (point, chunk) in points.iter_mut().zip(coords.chunks_exact(stride)) {
            *point = Landmark::new(chunk[0], chunk[1], chunk.get(2).copied().unwrap_or(0.0));
        }
        Ok(Self::new(points))
    }

    pub fn point(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    pub fn index_tip(&self) -> Landmark {
        self.points[INDEX_TIP]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPose {
    Cutting,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Max vertical gap between index and middle tips (normalised units).
    pub alignment_tolerance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            alignment_tolerance: 0.02,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, hand: &HandLandmarks) -> HandPose {
        let p = &hand.points;
        let index_extended = p[INDEX_TIP].y < p[INDEX_DIP].y;
        let middle_extended = p[MIDDLE_TIP].y < p[MIDDLE_DIP].y;
        let level = (p[INDEX_TIP].y - p[MIDDLE_TIP].y).abs() < self.config.alignment_tolerance;

        if index_extended && middle_extended && level {
            HandPose::Cutting
        } else {
            HandPose::Idle
        }
    }

    /// Index fingertip scaled to the field, if the hand is cutting.
    pub fn cut_point(&self, hand: &HandLandmarks, width: f32, height: f32) -> Option<Vec2> {
        match self.classify(hand) {
            HandPose::Cutting => {
                let tip = hand.index_tip();
                Some(Vec2::new(tip.x * width, tip.y * height))
            }
            HandPose::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Index and middle DIPs at y=0.5; the tips sit at the given heights.
    fn hand(index_tip_y: f32, middle_tip_y: f32) -> HandLandmarks {
        let mut points = [Landmark::new(0.5, 0.8, 0.0); LANDMARK_COUNT];
        points[INDEX_DIP] = Landmark::new(0.45, 0.5, 0.0);
        points[INDEX_TIP] = Landmark::new(0.45, index_tip_y, 0.0);
        points[MIDDLE_DIP] = Landmark::new(0.5, 0.5, 0.0);
        points[MIDDLE_TIP] = Landmark::new(0.5, middle_tip_y, 0.0);
        HandLandmarks::new(points)
    }

    #[test]
    fn two_raised_level_fingers_cut() {
        let classifier = GestureClassifier::default();
        assert_eq!(classifier.classify(&hand(0.4, 0.41)), HandPose::Cutting);

        let point = classifier.cut_point(&hand(0.4, 0.41), 800.0, 600.0).expect("cutting");
        assert!((point.x - 360.0).abs() < 1e-3);
        assert!((point.y - 240.0).abs() < 1e-3);
    }

    #[test]
    fn uneven_or_folded_fingers_are_idle() {
        let classifier = GestureClassifier::default();
        // tips too far apart
        assert_eq!(classifier.classify(&hand(0.4, 0.45)), HandPose::Idle);
        // index folded below its DIP
        assert_eq!(classifier.classify(&hand(0.6, 0.4)), HandPose::Idle);
        assert_eq!(classifier.cut_point(&hand(0.6, 0.4), 800.0, 600.0), None);
    }

    #[test]
    fn tolerance_comes_from_config() {
        let loose = GestureClassifier::new(GestureConfig {
            alignment_tolerance: 0.1,
        });
        assert_eq!(loose.classify(&hand(0.4, 0.45)), HandPose::Cutting);
    }

    #[test]
    fn flat_buffers_with_two_or_three_components() {
        let xyz: Vec<f32> = (0..LANDMARK_COUNT * 3).map(|i| i as f32).collect();
        let hand = HandLandmarks::from_flat(&xyz).expect("63 floats");
        assert_eq!(hand.point(1), Some(Landmark::new(3.0, 4.0, 5.0)));

        let xy: Vec<f32> = (0..LANDMARK_COUNT * 2).map(|i| i as f32).collect();
        let hand = HandLandmarks::from_flat(&xy).expect("42 floats");
        assert_eq!(hand.index_tip(), Landmark::new(16.0, 17.0, 0.0));

        assert!(matches!(HandLandmarks::from_flat(&[0.0; 10]), Err(SimError::InvalidLandmarks(_))));
        let mut bad = xy.clone();
        bad[3] = f32::NAN;
        assert!(HandLandmarks::from_flat(&bad).is_err());
    }

    #[test]
    fn slice_needs_exactly_21() {
        assert!(HandLandmarks::from_slice(&[Landmark::default(); 20]).is_err());
        assert!(HandLandmarks::from_slice(&[Landmark::default(); 21]).is_ok());
    }
}
