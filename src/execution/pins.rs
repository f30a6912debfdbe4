//! Input/output pin state.
//!
//! The host drives input pins and programs drive output pins. Reads made by a
//! program see the observed value, `input | output`.

use crate::execution::errors::VMError;
use crate::parsing::values::PinRange;

/// Fixed-size input and output pin arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pins {
    input: Vec<bool>,
    output: Vec<bool>,
}

impl Pins {
    pub fn new(count: usize) -> Self {
        Self {
            input: vec![false; count],
            output: vec![false; count],
        }
    }

    pub fn count(&self) -> usize {
        self.input.len()
    }

    fn check_index(&self, index: usize) -> Result<(), VMError> {
        if index < self.count() {
            Ok(())
        } else {
            Err(VMError::PinOutOfRange {
                index,
                count: self.count(),
            })
        }
    }

    fn check_len(&self, len: usize) -> Result<(), VMError> {
        if len == self.count() {
            Ok(())
        } else {
            Err(VMError::PinCountMismatch {
                expected: self.count(),
                actual: len,
            })
        }
    }

    fn check_range(&self, range: PinRange) -> Result<(), VMError> {
        self.check_index(range.start)?;
        self.check_index(range.end)
    }

    // ==================== Bulk ====================

    /// Replaces all input pins. `values` must have exactly [`count`](Self::count) entries.
    pub fn set_input_pins(&mut self, values: &[bool]) -> Result<(), VMError> {
        self.check_len(values.len())?;
        self.input.copy_from_slice(values);
        Ok(())
    }

    /// Replaces all output pins. `values` must have exactly [`count`](Self::count) entries.
    pub fn set_output_pins(&mut self, values: &[bool]) -> Result<(), VMError> {
        self.check_len(values.len())?;
        self.output.copy_from_slice(values);
        Ok(())
    }

    pub fn input_pins(&self) -> Vec<bool> {
        self.input.clone()
    }

    pub fn output_pins(&self) -> Vec<bool> {
        self.output.clone()
    }

    /// Observed values of every pin.
    pub fn values(&self) -> Vec<bool> {
        self.input
            .iter()
            .zip(&self.output)
            .map(|(i, o)| *i || *o)
            .collect()
    }

    // ==================== Single pin ====================

    pub fn input_pin(&self, index: usize) -> Result<bool, VMError> {
        self.check_index(index)?;
        Ok(self.input[index])
    }

    pub fn output_pin(&self, index: usize) -> Result<bool, VMError> {
        self.check_index(index)?;
        Ok(self.output[index])
    }

    pub fn set_input_pin(&mut self, index: usize, value: bool) -> Result<(), VMError> {
        self.check_index(index)?;
        self.input[index] = value;
        Ok(())
    }

    pub fn set_output_pin(&mut self, index: usize, value: bool) -> Result<(), VMError> {
        self.check_index(index)?;
        self.output[index] = value;
        Ok(())
    }

    /// Observed value of pin `index`: input OR output.
    pub fn value(&self, index: usize) -> Result<bool, VMError> {
        self.check_index(index)?;
        Ok(self.input[index] || self.output[index])
    }

    // ==================== Ranges ====================

    /// Observed values over `range`, in index order.
    pub(crate) fn read_range(&self, range: PinRange) -> Result<Vec<bool>, VMError> {
        self.check_range(range)?;
        Ok(range
            .indices()
            .map(|i| self.input[i] || self.output[i])
            .collect())
    }

    /// Writes `bits` to the output pins of `range`, in index order.
    pub(crate) fn write_range(&mut self, range: PinRange, bits: &[bool]) -> Result<(), VMError> {
        self.check_range(range)?;
        if bits.len() != range.count() {
            return Err(VMError::PinCountMismatch {
                expected: range.count(),
                actual: bits.len(),
            });
        }
        if bits.is_empty() {
            return Ok(());
        }
        self.output[range.start..=range.end].copy_from_slice(bits);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins() -> Pins {
        let mut pins = Pins::new(4);
        pins.set_input_pins(&[true, false, false, false]).unwrap();
        pins.set_output_pins(&[false, true, false, false]).unwrap();
        pins
    }

    #[test]
    fn observed_value_is_input_or_output() {
        let pins = pins();
        assert_eq!(pins.value(0), Ok(true));
        assert_eq!(pins.value(1), Ok(true));
        assert_eq!(pins.value(2), Ok(false));
        assert_eq!(pins.value(3), Ok(false));
        assert_eq!(pins.values(), vec![true, true, false, false]);
    }

    #[test]
    fn input_and_output_are_independent() {
        let pins = pins();
        assert_eq!(pins.input_pins(), vec![true, false, false, false]);
        assert_eq!(pins.output_pins(), vec![false, true, false, false]);
        assert_eq!(pins.input_pin(1), Ok(false));
        assert_eq!(pins.output_pin(1), Ok(true));
    }

    #[test]
    fn set_single_pins() {
        let mut pins = Pins::new(4);
        pins.set_input_pin(2, true).unwrap();
        pins.set_output_pin(3, true).unwrap();
        assert_eq!(pins.values(), vec![false, false, true, true]);
    }

    #[test]
    fn bulk_set_requires_exact_length() {
        let mut pins = Pins::new(4);
        assert_eq!(
            pins.set_input_pins(&[true; 3]),
            Err(VMError::PinCountMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert!(pins.set_output_pins(&[true; 5]).is_err());
        assert_eq!(pins.values(), vec![false; 4]);
    }

    #[test]
    fn index_out_of_range() {
        let mut pins = Pins::new(4);
        assert_eq!(
            pins.value(4),
            Err(VMError::PinOutOfRange { index: 4, count: 4 })
        );
        assert!(pins.set_output_pin(10, true).is_err());
        assert!(pins.input_pin(4).is_err());
    }

    #[test]
    fn ranges() {
        let mut pins = pins();
        pins.write_range(PinRange::new(2, 3), &[true, false]).unwrap();
        assert_eq!(pins.output_pins(), vec![false, true, true, false]);
        assert_eq!(
            pins.read_range(PinRange::new(0, 3)).unwrap(),
            vec![true, true, true, false]
        );
        assert!(pins.read_range(PinRange::new(3, 4)).is_err());
        assert!(pins.write_range(PinRange::new(0, 1), &[true]).is_err());
    }
}
