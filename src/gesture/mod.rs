//! Tilt gesture recognition
//!
//! Orientation readings come in at whatever rate the device reports them;
//! discrete `up` / `down` / `neutral` events come out.

pub mod calibration;
pub mod recognizer;
pub mod source;
pub mod types;

pub use calibration::{Calibration, CalibrationBaseline};
pub use recognizer::GestureRecognizer;
pub use source::{MotionPermission, OrientationSource, RecognizerHandle, SampleListener, ScreenAngle, SubscriptionId};
pub use types::{Direction, GestureConfig, OrientationSample, RawOrientation, TiltEvent};
