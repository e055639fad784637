//! Per-frame conversion from detector output to driver transforms.

use crate::config::{DetectType, LiveConfig};
use retarget_core::{DriverFrame, LandmarkSet};

/// Turns one detector result into a [`DriverFrame`].
pub trait ProcessingChain {
    fn process(&mut self, landmarks: &LandmarkSet) -> DriverFrame;
}

/// Builds the chain for a session. Any `FnMut(&LiveConfig) -> C` works.
pub trait ChainBuilder {
    type Chain: ProcessingChain;

    fn build(&mut self, config: &LiveConfig) -> Self::Chain;
}

impl<C, F> ChainBuilder for F
where
    C: ProcessingChain,
    F: FnMut(&LiveConfig) -> C,
{
    type Chain = C;

    fn build(&mut self, config: &LiveConfig) -> C {
        self(config)
    }
}

/// Default chain: keeps landmarks of the configured detector type and
/// converts each into a driver named after the landmark.
///
/// Ungrouped landmarks are always kept. Non-finite positions are dropped.
#[derive(Clone, Debug, Default)]
pub struct LandmarkChain {
    detect_type: DetectType,
    dropped: usize,
}

impl LandmarkChain {
    pub fn new(detect_type: DetectType) -> Self {
        Self {
            detect_type,
            dropped: 0,
        }
    }

    pub fn from_config(config: &LiveConfig) -> Self {
        Self::new(config.detect_type)
    }

    pub fn detect_type(&self) -> DetectType {
        self.detect_type
    }

    /// Landmarks dropped for non-finite positions so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl ProcessingChain for LandmarkChain {
    fn process(&mut self, landmarks: &LandmarkSet) -> DriverFrame {
        let mut frame = DriverFrame::new();
        for (name, lm) in landmarks.iter() {
            if let Some(group) = lm.group {
                if !self.detect_type.accepts(group) {
                    continue;
                }
            }
            if !lm.is_finite() {
                log::warn!("landmark {name}: non-finite position, dropped");
                self.dropped += 1;
                continue;
            }
            frame.insert(name, lm.to_driver());
        }
        frame
    }
}
