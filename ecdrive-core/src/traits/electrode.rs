//! Electrode actuator trait

/// Low-level access to the counter electrode and the segment work electrodes
///
/// Implementations hold the pin map and nothing else: every call is a
/// direct hardware effect. Segment indices are `0..segment_count()`; the
/// engines never pass an index outside that range.
pub trait ElectrodeActuator {
    /// Number of segments wired to this actuator
    fn segment_count(&self) -> usize;

    /// Drive the counter electrode to a converter level
    ///
    /// The level is in the same units as segment readings, so full scale
    /// corresponds to the supply rail.
    fn set_counter_level(&mut self, level: u16);

    /// Drive the counter electrode output to zero
    fn disable_counter(&mut self);

    /// Configure a segment pin as digital output and assert `high`
    fn drive_segment(&mut self, index: usize, high: bool);

    /// Configure a segment pin as analog input and sample it once
    fn read_segment(&mut self, index: usize) -> u16;

    /// Return a segment pin to high impedance
    fn release_segment(&mut self, index: usize);

    /// Return every segment pin to high impedance
    ///
    /// This is the resting state between operations. It is not the same as
    /// bleaching: a bleached segment is driven low only during its pulse.
    fn release_all(&mut self) {
        for index in 0..self.segment_count() {
            self.release_segment(index);
        }
    }
}
