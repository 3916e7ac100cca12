//! Reference data: FMEA tables and spectral presets.
//!
//! These are curated lookups keyed by severity, not computed from a signal.

use super::{Vibration, ALARM_THRESHOLD_RMS, CRITICAL_THRESHOLD_RMS};
use crate::types::{FmeaProfile, FmeaRow, FmeaTable, SpectralBuckets};

static LOOSENESS_ROWS: [FmeaRow; 3] = [
    FmeaRow {
        failure_mode: "Mechanical Looseness",
        probability: "80%",
        signature: "1x RPM Harmonics",
        inspection_action: "Check mounting bolts & baseplate",
    },
    FmeaRow {
        failure_mode: "Structural Resonance",
        probability: "15%",
        signature: "Natural Frequency Match",
        inspection_action: "Impact test foundation",
    },
    FmeaRow {
        failure_mode: "Other",
        probability: "5%",
        signature: "Various",
        inspection_action: "General inspection required",
    },
];

static MISALIGNMENT_ROWS: [FmeaRow; 3] = [
    FmeaRow {
        failure_mode: "Misalignment",
        probability: "60%",
        signature: "2x RPM Radial",
        inspection_action: "Laser alignment required",
    },
    FmeaRow {
        failure_mode: "Bearing Wear",
        probability: "30%",
        signature: "High Frequency Noise",
        inspection_action: "Grease analysis / Replacement",
    },
    FmeaRow {
        failure_mode: "Cavitation",
        probability: "10%",
        signature: "Random Low Frequency",
        inspection_action: "Check suction valve & NPSH",
    },
];

const LOOSENESS_SPECTRUM: SpectralBuckets = SpectralBuckets {
    one_x: 0.8,
    two_x: 0.1,
    three_x: 0.05,
};

const MISALIGNMENT_SPECTRUM: SpectralBuckets = SpectralBuckets {
    one_x: 0.2,
    two_x: 0.6,
    three_x: 0.1,
};

const NOISE_FLOOR_SPECTRUM: SpectralBuckets = SpectralBuckets {
    one_x: 0.05,
    two_x: 0.05,
    three_x: 0.05,
};

/// FMEA table for a reading: looseness above 0.5 in/s, misalignment otherwise.
pub fn fmea_table(vibration: Vibration) -> FmeaTable {
    if vibration.rms() > CRITICAL_THRESHOLD_RMS {
        FmeaTable {
            profile: FmeaProfile::Looseness,
            rows: &LOOSENESS_ROWS,
        }
    } else {
        FmeaTable {
            profile: FmeaProfile::Misalignment,
            rows: &MISALIGNMENT_ROWS,
        }
    }
}

/// Spectral preset for a reading, partitioned exactly like `classify`.
pub fn spectral_buckets(vibration: Vibration) -> SpectralBuckets {
    let v = vibration.rms();
    if v > CRITICAL_THRESHOLD_RMS {
        LOOSENESS_SPECTRUM
    } else if v > ALARM_THRESHOLD_RMS {
        MISALIGNMENT_SPECTRUM
    } else {
        NOISE_FLOOR_SPECTRUM
    }
}
