//! Input side: turns hand landmarks into cut events.

pub mod gesture;

pub use gesture::{GestureClassifier, GestureConfig, HandLandmarks, HandPose, Landmark, LANDMARK_COUNT};
