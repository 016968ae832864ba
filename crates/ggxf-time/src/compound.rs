//! Sum of base time functions with an optional validity window.

use ggxf_core::{Memo, Real};

use crate::function::{BaseTimeFunction, TimeFunctionDefinition};
use crate::error::{TimeError, TimeResult};

/// Additive combination of [`BaseTimeFunction`]s.
///
/// Outside `[min_epoch, max_epoch]` the function is undefined (`None`), which
/// callers must keep distinct from a zero factor. The most recent `value_at`
/// and `value_change` results are memoized; adding a function clears both.
#[derive(Debug, Clone, Default)]
pub struct CompoundTimeFunction {
    functions: Vec<BaseTimeFunction>,
    min_epoch: Option<Real>,
    max_epoch: Option<Real>,
    value_cache: Memo<Real, Option<Real>>,
    change_cache: Memo<(Real, Real), Option<Real>>,
}

impl CompoundTimeFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// A compound function that is undefined outside the given epochs.
    pub fn with_validity(min_epoch: Option<Real>, max_epoch: Option<Real>) -> TimeResult<Self> {
        if let (Some(start), Some(end)) = (min_epoch, max_epoch) {
            if end < start {
                return Err(TimeError::InvalidWindow {
                    function: "compound",
                    start,
                    end,
                });
            }
        }
        Ok(Self {
            min_epoch,
            max_epoch,
            ..Self::default()
        })
    }

    /// Build from a list of keyed definitions, as stored in group metadata.
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = &'a TimeFunctionDefinition>,
    ) -> TimeResult<Self> {
        let mut compound = Self::new();
        for definition in definitions {
            compound.add_function(BaseTimeFunction::from_definition(definition)?);
        }
        Ok(compound)
    }

    pub fn add_function(&mut self, function: BaseTimeFunction) {
        self.functions.push(function);
        self.value_cache.clear();
        self.change_cache.clear();
    }

    pub fn functions(&self) -> &[BaseTimeFunction] {
        &self.functions
    }

    pub fn validity(&self) -> (Option<Real>, Option<Real>) {
        (self.min_epoch, self.max_epoch)
    }

    fn evaluate(&self, epoch: Real) -> Option<Real> {
        if self.min_epoch.is_some_and(|min| epoch < min)
            || self.max_epoch.is_some_and(|max| epoch > max)
        {
            return None;
        }
        Some(self.functions.iter().map(|f| f.value_at(epoch)).sum())
    }

    /// Summed value at `epoch`, or `None` outside the validity window.
    pub fn value_at(&self, epoch: Real) -> Option<Real> {
        self.value_cache
            .get_or_insert_with(epoch, || self.evaluate(epoch))
    }

    /// `value_at(epoch) - value_at(reference_epoch)`; `None` if either is undefined.
    pub fn value_change(&self, epoch: Real, reference_epoch: Real) -> Option<Real> {
        self.change_cache
            .get_or_insert_with((epoch, reference_epoch), || {
                let value = self.evaluate(epoch)?;
                let reference = self.value_at(reference_epoch)?;
                Some(value - reference)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn velocity_then_step() -> CompoundTimeFunction {
        let mut compound = CompoundTimeFunction::new();
        compound.add_function(
            BaseTimeFunction::velocity(2000.0, 2.0).with_window(None, Some(2005.0)),
        );
        compound.add_function(BaseTimeFunction::step(2010.0, 5.0));
        compound
    }

    #[test]
    fn sums_base_functions() {
        let compound = velocity_then_step();
        assert_eq!(compound.value_at(2002.0), Some(4.0));
        assert_eq!(compound.value_at(2011.0), Some(15.0));
        // Repeated query is served from the cache and stays identical
        assert_eq!(compound.value_at(2011.0), Some(15.0));
    }

    #[test]
    fn empty_compound_is_zero() {
        assert_eq!(CompoundTimeFunction::new().value_at(2020.0), Some(0.0));
    }

    #[test]
    fn adding_a_function_invalidates_cache() {
        let mut compound = CompoundTimeFunction::new();
        compound.add_function(BaseTimeFunction::velocity(2000.0, 1.0));
        assert_eq!(compound.value_at(2010.0), Some(10.0));
        assert_eq!(compound.value_change(2010.0, 2005.0), Some(5.0));
        compound.add_function(BaseTimeFunction::step(2000.0, 1.0));
        assert_eq!(compound.value_at(2010.0), Some(11.0));
        assert_eq!(compound.value_change(2010.0, 1999.0), Some(11.0 - (-1.0)));
    }

    #[test]
    fn validity_window_yields_undefined() {
        let mut compound = CompoundTimeFunction::with_validity(Some(2000.0), Some(2020.0)).unwrap();
        compound.add_function(BaseTimeFunction::velocity(2000.0, 1.0));
        assert_eq!(compound.value_at(1999.0), None);
        assert_eq!(compound.value_at(2021.0), None);
        assert_eq!(compound.value_at(2020.0), Some(20.0));
        assert_eq!(compound.value_change(2010.0, 1990.0), None);
        assert_eq!(compound.value_change(2025.0, 2010.0), None);
        assert_eq!(compound.value_change(2015.0, 2010.0), Some(5.0));
    }

    #[test]
    fn inverted_validity_is_rejected() {
        assert!(matches!(
            CompoundTimeFunction::with_validity(Some(2020.0), Some(2000.0)),
            Err(TimeError::InvalidWindow { .. })
        ));
    }
}
