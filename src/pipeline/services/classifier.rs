use crate::common::landmark::{index, LandmarkFrame};
use crate::pipeline::types::{Gesture, GestureLabel};

/// Which fingers are extended in one landmark set.
///
/// A finger is extended when its tip sits above (smaller `y`) its reference
/// joint. The thumb is measured tip vs. IP joint, the others tip vs. MCP knuckle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn from_landmarks(hand: &LandmarkFrame) -> Self {
        let extended = |tip: usize, joint: usize| hand.point(tip).y < hand.point(joint).y;
        Self {
            thumb: extended(index::THUMB_TIP, index::THUMB_IP),
            index: extended(index::INDEX_TIP, index::INDEX_MCP),
            middle: extended(index::MIDDLE_TIP, index::MIDDLE_MCP),
            ring: extended(index::RING_TIP, index::RING_MCP),
            pinky: extended(index::PINKY_TIP, index::PINKY_MCP),
        }
    }
}

/// Maps one hand pose to a gesture label. Pure and total.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandmarkClassifier;

impl LandmarkClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, hand: Option<&LandmarkFrame>) -> GestureLabel {
        hand.and_then(|hand| Self::classify_fingers(FingerStates::from_landmarks(hand)))
    }

    /// Rules in priority order, first match wins.
    pub fn classify_fingers(f: FingerStates) -> GestureLabel {
        if f.thumb && !f.index && !f.middle {
            // thumbs up
            Some(Gesture::FanOn)
        } else if f.index && f.middle && !f.ring && !f.pinky {
            // victory
            Some(Gesture::LightOn)
        } else if f.index && f.middle && f.ring && f.pinky {
            // open palm
            Some(Gesture::FanOff)
        } else if !f.index && !f.middle && !f.ring && !f.pinky {
            // fist
            Some(Gesture::LightOff)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::landmark::{Landmark, HAND_LANDMARK_COUNT};

    const KNUCKLE_Y: f32 = 0.5;

    fn tip_y(extended: bool) -> f32 {
        if extended {
            0.3
        } else {
            0.7
        }
    }

    fn hand(f: FingerStates) -> LandmarkFrame {
        let mut points = [Landmark::new(0.5, KNUCKLE_Y); HAND_LANDMARK_COUNT];
        points[index::THUMB_TIP].y = tip_y(f.thumb);
        points[index::INDEX_TIP].y = tip_y(f.index);
        points[index::MIDDLE_TIP].y = tip_y(f.middle);
        points[index::RING_TIP].y = tip_y(f.ring);
        points[index::PINKY_TIP].y = tip_y(f.pinky);
        LandmarkFrame::new(points)
    }

    fn all_poses() -> impl Iterator<Item = FingerStates> {
        (0u8..32).map(|bits| FingerStates {
            thumb: bits & 1 != 0,
            index: bits & 2 != 0,
            middle: bits & 4 != 0,
            ring: bits & 8 != 0,
            pinky: bits & 16 != 0,
        })
    }

    #[test]
    fn finger_states_follow_tip_vs_joint() {
        let pose = FingerStates {
            thumb: true,
            index: false,
            middle: true,
            ring: false,
            pinky: true,
        };
        assert_eq!(FingerStates::from_landmarks(&hand(pose)), pose);
    }

    #[test]
    fn thumbs_up_is_fan_on_regardless_of_ring_and_pinky() {
        let classifier = LandmarkClassifier::new();
        for (ring, pinky) in [(false, false), (false, true), (true, false), (true, true)] {
            let pose = FingerStates {
                thumb: true,
                index: false,
                middle: false,
                ring,
                pinky,
            };
            assert_eq!(classifier.classify(Some(&hand(pose))), Some(Gesture::FanOn));
        }
    }

    #[test]
    fn victory_palm_and_fist() {
        let classifier = LandmarkClassifier::new();
        let victory = FingerStates {
            index: true,
            middle: true,
            ..Default::default()
        };
        assert_eq!(classifier.classify(Some(&hand(victory))), Some(Gesture::LightOn));

        let palm = FingerStates {
            thumb: true,
            index: true,
            middle: true,
            ring: true,
            pinky: true,
        };
        assert_eq!(classifier.classify(Some(&hand(palm))), Some(Gesture::FanOff));

        let fist = FingerStates::default();
        assert_eq!(classifier.classify(Some(&hand(fist))), Some(Gesture::LightOff));
    }

    #[test]
    fn ambiguous_pose_and_missing_hand_are_none() {
        let classifier = LandmarkClassifier::new();
        let pointing = FingerStates {
            index: true,
            ..Default::default()
        };
        assert_eq!(classifier.classify(Some(&hand(pointing))), None);
        assert_eq!(classifier.classify(None), None);
    }

    #[test]
    fn tip_level_with_knuckle_counts_as_folded() {
        let classifier = LandmarkClassifier::new();
        let flat = LandmarkFrame::new([Landmark::new(0.5, KNUCKLE_Y); HAND_LANDMARK_COUNT]);
        assert_eq!(classifier.classify(Some(&flat)), Some(Gesture::LightOff));
    }

    #[test]
    fn classification_is_total_and_deterministic() {
        let classifier = LandmarkClassifier::new();
        for pose in all_poses() {
            let frame = hand(pose);
            let first = classifier.classify(Some(&frame));
            assert_eq!(first, classifier.classify(Some(&frame)));
            assert_eq!(first, LandmarkClassifier::classify_fingers(pose));
        }
    }
}
