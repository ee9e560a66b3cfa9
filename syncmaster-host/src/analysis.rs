//! Event recovery from a recorded sync line
//!
//! The recording system samples a copy of the device output alongside its
//! own data. Each pulse is found by thresholding, and its width picks the
//! event: see [`EventKind::classify`].

use syncmaster_protocol::EventKind;

/// Fraction of the recording's peak used as the pulse threshold
pub const THRESHOLD_RATIO: f64 = 0.75;

/// A pulse found in a recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedEvent {
    /// Sample index where the pulse starts
    pub onset: usize,
    /// Event the pulse width maps to
    pub kind: EventKind,
    /// Measured pulse width in milliseconds
    pub width_ms: f64,
}

/// Find event pulses in a recorded signal
///
/// A pulse starts at a sample above `0.75 * max` and ends at the first
/// sample below it; samples sitting exactly on the threshold extend the
/// pulse. Pulses still high at the end of the recording, or too short to
/// be an event, are skipped.
pub fn detect_events(samples: &[f64], sample_rate_hz: f64) -> Vec<DetectedEvent> {
    let mut events = Vec::new();
    if sample_rate_hz <= 0.0 {
        return events;
    }

    let peak = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() || peak <= 0.0 {
        return events;
    }
    let threshold = THRESHOLD_RATIO * peak;

    let mut idx = 0;
    while idx < samples.len() {
        if samples[idx] <= threshold {
            idx += 1;
            continue;
        }

        let onset = idx;
        let end = match samples[onset..].iter().position(|&s| s < threshold) {
            Some(len) => onset + len,
            None => break,
        };

        let width_ms = (end - onset) as f64 * 1000.0 / sample_rate_hz;
        if let Some(kind) = EventKind::classify(width_ms as f32) {
            events.push(DetectedEvent {
                onset,
                kind,
                width_ms,
            });
        }

        idx = end;
    }

    events
}

/// Onsets of one kind of event
pub fn onsets(events: &[DetectedEvent], kind: EventKind) -> Vec<usize> {
    events
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.onset)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// 1 kHz recording: one sample per millisecond
    const RATE: f64 = 1000.0;

    fn recording(pulses: &[(usize, usize)], len: usize) -> Vec<f64> {
        let mut samples = vec![0.0; len];
        for &(onset, width) in pulses {
            for s in &mut samples[onset..onset + width] {
                *s = 3.3;
            }
        }
        samples
    }

    #[test]
    fn test_all_event_widths() {
        let samples = recording(&[(100, 50), (300, 100), (600, 150), (900, 200)], 1300);
        let events = detect_events(&samples, RATE);

        let kinds: Vec<_> = events.iter().map(|e| (e.onset, e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (100, EventKind::Start),
                (300, EventKind::End),
                (600, EventKind::Event1),
                (900, EventKind::Event2),
            ]
        );
        assert_eq!(events[1].width_ms, 100.0);
    }

    #[test]
    fn test_short_glitch_ignored() {
        let samples = recording(&[(10, 5), (100, 50)], 300);
        let events = detect_events(&samples, RATE);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Start);
    }

    #[test]
    fn test_unfinished_pulse_ignored() {
        // Second pulse is still high on the last sample
        let samples = recording(&[(100, 50), (250, 30)], 280);
        let events = detect_events(&samples, RATE);
        assert_eq!(events.len(), 1);
        assert_eq!(onsets(&events, EventKind::Start), vec![100]);
    }

    #[test]
    fn test_sample_on_threshold_extends_pulse() {
        // Peak 4.0 puts the threshold at exactly 3.0
        let mut samples = vec![0.0; 300];
        for s in &mut samples[100..140] {
            *s = 4.0;
        }
        for s in &mut samples[140..190] {
            *s = 3.0;
        }
        let events = detect_events(&samples, RATE);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].onset, 100);
        assert_eq!(events[0].kind, EventKind::End);
        assert_eq!(events[0].width_ms, 90.0);
    }

    #[test]
    fn test_sample_rate_scaling() {
        // 10 kHz: a 150 ms pulse is 1500 samples
        let samples = recording(&[(500, 1500)], 3000);
        let events = detect_events(&samples, 10_000.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Event1);
        assert_eq!(events[0].onset, 500);
    }

    #[test]
    fn test_threshold_follows_peak() {
        // Baseline noise below 75% of peak does not trigger
        let mut samples = recording(&[(200, 100)], 500);
        for s in samples.iter_mut().take(150) {
            *s = 2.0;
        }
        let events = detect_events(&samples, RATE);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::End);
    }

    #[test]
    fn test_flat_or_empty_recording() {
        assert!(detect_events(&[], RATE).is_empty());
        assert!(detect_events(&[0.0; 100], RATE).is_empty());
        assert!(detect_events(&[1.0; 100], 0.0).is_empty());
    }
}
