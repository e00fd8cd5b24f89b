//! Last-known-value frame store and its scaled/raw accessors.

use std::f64::consts::PI;

use crate::protocol::{
    ANGLE_RANGE_DEGREES, FRAME_WORDS, SLOT_AZIMUTH, SLOT_ELEVATION, SLOT_M11, SLOT_Q0, SLOT_ROLL,
    SLOT_X, SLOT_Y, SLOT_Z, WORD_FULL_SCALE,
};

/// The most recently retrieved data frame plus the position scaling factor.
///
/// Every accessor is a pure read of the stored values; nothing here touches
/// the device. Until the first refresh the frame is all zeros and the
/// scaling factor is 0.0, so every accessor reads as zero. A refresh only
/// overwrites the slots covered by the active [`DataFormat`]; the rest keep
/// their last-known values.
///
/// [`DataFormat`]: crate::DataFormat
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    slots: [i16; FRAME_WORDS],
    pos_scale: f64,
}

impl FrameStore {
    pub fn new() -> FrameStore {
        FrameStore::default()
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [i16; FRAME_WORDS] {
        &mut self.slots
    }

    pub(crate) fn set_scaling(&mut self, scale: f64) {
        self.pos_scale = scale;
    }

    /// The position scaling factor from the most recent refresh.
    pub fn scaling(&self) -> f64 {
        self.pos_scale
    }

    /// All 19 raw slots in frame order.
    pub fn raw_slots(&self) -> &[i16; FRAME_WORDS] {
        &self.slots
    }

    fn scale_position(&self, slot: usize) -> f64 {
        self.slots[slot] as f64 * self.pos_scale / WORD_FULL_SCALE
    }

    fn scale_radians(&self, slot: usize) -> f64 {
        self.slots[slot] as f64 * PI / WORD_FULL_SCALE
    }

    fn scale_degrees(&self, slot: usize) -> f64 {
        self.slots[slot] as f64 * ANGLE_RANGE_DEGREES / WORD_FULL_SCALE
    }

    fn scale_unit(&self, slot: usize) -> f64 {
        self.slots[slot] as f64 / WORD_FULL_SCALE
    }

    /// Scaled x position.
    pub fn scaled_x(&self) -> f64 {
        self.scale_position(SLOT_X)
    }

    /// Scaled y position.
    pub fn scaled_y(&self) -> f64 {
        self.scale_position(SLOT_Y)
    }

    /// Scaled z position.
    pub fn scaled_z(&self) -> f64 {
        self.scale_position(SLOT_Z)
    }

    /// Scaled position vector `[x, y, z]`.
    pub fn position(&self) -> [f64; 3] {
        [self.scaled_x(), self.scaled_y(), self.scaled_z()]
    }

    /// Azimuth in radians.
    pub fn azimuth_radians(&self) -> f64 {
        self.scale_radians(SLOT_AZIMUTH)
    }

    /// Elevation in radians.
    pub fn elevation_radians(&self) -> f64 {
        self.scale_radians(SLOT_ELEVATION)
    }

    /// Roll in radians.
    pub fn roll_radians(&self) -> f64 {
        self.scale_radians(SLOT_ROLL)
    }

    /// Azimuth in degrees.
    pub fn azimuth_degrees(&self) -> f64 {
        self.scale_degrees(SLOT_AZIMUTH)
    }

    /// Elevation in degrees.
    pub fn elevation_degrees(&self) -> f64 {
        self.scale_degrees(SLOT_ELEVATION)
    }

    /// Roll in degrees.
    pub fn roll_degrees(&self) -> f64 {
        self.scale_degrees(SLOT_ROLL)
    }

    /// Scaled quaternion `[q0, q1, q2, q3]`, each component in [-1, 1].
    pub fn quaternion(&self) -> [f64; 4] {
        [
            self.scale_unit(SLOT_Q0),
            self.scale_unit(SLOT_Q0 + 1),
            self.scale_unit(SLOT_Q0 + 2),
            self.scale_unit(SLOT_Q0 + 3),
        ]
    }

    /// Scaled 3x3 rotation matrix, row-major, entries in [-1, 1].
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.scale_unit(SLOT_M11 + i * 3 + j);
            }
        }
        m
    }

    /// Raw x position.
    pub fn raw_x(&self) -> i16 {
        self.slots[SLOT_X]
    }

    /// Raw y position.
    pub fn raw_y(&self) -> i16 {
        self.slots[SLOT_Y]
    }

    /// Raw z position.
    pub fn raw_z(&self) -> i16 {
        self.slots[SLOT_Z]
    }

    /// Raw azimuth.
    pub fn raw_azimuth(&self) -> i16 {
        self.slots[SLOT_AZIMUTH]
    }

    /// Raw elevation.
    pub fn raw_elevation(&self) -> i16 {
        self.slots[SLOT_ELEVATION]
    }

    /// Raw roll.
    pub fn raw_roll(&self) -> i16 {
        self.slots[SLOT_ROLL]
    }

    /// Raw quaternion `[q0, q1, q2, q3]`.
    pub fn raw_quaternion(&self) -> [i16; 4] {
        [
            self.slots[SLOT_Q0],
            self.slots[SLOT_Q0 + 1],
            self.slots[SLOT_Q0 + 2],
            self.slots[SLOT_Q0 + 3],
        ]
    }

    /// Raw 3x3 rotation matrix, row-major.
    pub fn raw_matrix(&self) -> [[i16; 3]; 3] {
        let mut m = [[0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.slots[SLOT_M11 + i * 3 + j];
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::apply_record;
    use crate::DataFormat;

    #[test]
    fn test_everything_zero_before_first_refresh() {
        let frame = FrameStore::new();
        assert_eq!(frame.position(), [0.0; 3]);
        assert_eq!(frame.azimuth_radians(), 0.0);
        assert_eq!(frame.roll_degrees(), 0.0);
        assert_eq!(frame.quaternion(), [0.0; 4]);
        assert_eq!(frame.matrix(), [[0.0; 3]; 3]);
        assert_eq!(frame.raw_quaternion(), [0; 4]);
        assert_eq!(frame.scaling(), 0.0);
    }

    #[test]
    fn test_scaled_position() {
        let mut frame = FrameStore::new();
        frame.slots_mut()[SLOT_X] = 16383;
        frame.slots_mut()[SLOT_Y] = -16383;
        frame.set_scaling(2.0);

        assert!((frame.scaled_x() - 16383.0 * 2.0 / 32767.0).abs() < 1e-12);
        assert!((frame.scaled_x() - 0.99994).abs() < 1e-4);
        assert!((frame.scaled_y() + frame.scaled_x()).abs() < 1e-12);
        assert_eq!(frame.scaled_z(), 0.0);
        assert_eq!(frame.position()[0], frame.scaled_x());
    }

    #[test]
    fn test_angle_scaling() {
        let mut frame = FrameStore::new();
        frame.slots_mut()[SLOT_AZIMUTH] = 32767;
        frame.slots_mut()[SLOT_ELEVATION] = -32767;

        assert_eq!(frame.azimuth_radians(), PI);
        assert_eq!(frame.azimuth_degrees(), 180.0);
        assert_eq!(frame.elevation_radians(), -PI);
        assert_eq!(frame.elevation_degrees(), -180.0);
        assert_eq!(frame.roll_radians(), 0.0);
    }

    #[test]
    fn test_quaternion_scaling() {
        let mut frame = FrameStore::new();
        apply_record(
            frame.slots_mut(),
            DataFormat::Quaternion,
            &[32767, -32767, 0, 16383],
        );

        let q = frame.quaternion();
        assert_eq!(q[0], 1.0);
        assert_eq!(q[1], -1.0);
        assert_eq!(q[2], 0.0);
        assert!((q[3] - 16383.0 / 32767.0).abs() < 1e-12);
        assert_eq!(frame.raw_quaternion(), [32767, -32767, 0, 16383]);
    }

    #[test]
    fn test_matrix_scaling_row_major() {
        let mut frame = FrameStore::new();
        let words: Vec<i16> = vec![32767, 0, 0, 0, 32767, 0, 0, 0, -32767];
        apply_record(frame.slots_mut(), DataFormat::Matrix, &words);

        let m = frame.matrix();
        assert_eq!(m[0][0], 1.0);
        assert_eq!(m[1][1], 1.0);
        assert_eq!(m[2][2], -1.0);
        assert_eq!(m[0][1], 0.0);

        let raw = frame.raw_matrix();
        assert_eq!(raw[2][2], -32767);
    }

    #[test]
    fn test_scaling_only_affects_position() {
        let mut frame = FrameStore::new();
        frame.slots_mut()[SLOT_X] = 1000;
        frame.slots_mut()[SLOT_AZIMUTH] = 1000;
        frame.set_scaling(36.0);

        let with_36 = (frame.scaled_x(), frame.azimuth_degrees());
        frame.set_scaling(72.0);
        let with_72 = (frame.scaled_x(), frame.azimuth_degrees());

        assert!((with_72.0 - 2.0 * with_36.0).abs() < 1e-12);
        assert_eq!(with_36.1, with_72.1);
    }
}
