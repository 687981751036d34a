use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Cached keyframe interval of one track.
///
/// Playback time mostly moves forward by less than one key per frame, so the
/// interval search first scans a few keys around the last hit and only falls
/// back to a binary search on large jumps (scrubbing, loop restart).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

impl KeyframeCursor {
    pub fn reset(&mut self) {
        self.last_index = 0;
    }
}

/// Keyframes of one transform component, stored as parallel time/value arrays.
///
/// Times are in seconds and strictly ascending (validated by the animation
/// builder).
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        debug_assert_eq!(times.len(), values.len());
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Single-key track holding `value` from time 0.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self::new(vec![0.0], vec![value], InterpolationMode::Linear)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last key, `0.0` for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling (binary search). `None` for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        let index = next_idx.saturating_sub(1);
        Some(self.sample_at_frame(index, time))
    }

    /// Sampling with a cached cursor; `cursor` is updated to the found interval.
    ///
    /// Outside the key range the first/last value is held.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        match len {
            0 => return None,
            1 => return Some(self.values[0]),
            _ => {}
        }

        let index = match self.scan_from(cursor.last_index.min(len - 1), time) {
            Some(index) => index,
            None => {
                let next_idx = self.times.partition_point(|&t| t <= time);
                next_idx.saturating_sub(1)
            }
        };

        cursor.last_index = index;
        Some(self.sample_at_frame(index, time))
    }

    /// Local search around `start`; returns the index `i` with
    /// `times[i] <= time < times[i + 1]` (or a clamped end index).
    fn scan_from(&self, start: usize, time: f32) -> Option<usize> {
        let len = self.times.len();

        if time >= self.times[start] {
            // Forward: playback or fast-forward.
            for idx in start..=(start + MAX_SCAN_OFFSET) {
                if idx >= len - 1 {
                    return Some(len - 1);
                }
                if time < self.times[idx + 1] {
                    return Some(idx);
                }
            }
            None
        } else {
            // Backward: reverse playback or a small rewind.
            for offset in 1..=MAX_SCAN_OFFSET {
                let idx = start.checked_sub(offset)?;
                if time >= self.times[idx] {
                    return Some(idx);
                }
            }
            if start <= MAX_SCAN_OFFSET {
                // Before the first key.
                return Some(0);
            }
            None
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.values[len - 1];
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => {
                T::interpolate_linear(self.values[index], self.values[next_idx], t)
            }
        }
    }
}
