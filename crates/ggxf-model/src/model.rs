//! Root aggregator: the catalog plus every configured group.

use std::collections::BTreeMap;
use std::sync::Arc;

use ggxf_core::{Memo, ParamId, Real, ensure_finite_xy};
use tracing::{debug, info, warn};

use crate::content::{ContentType, ParameterSetPolicy};
use crate::error::{ConfigError, ConfigResult, EvalError, EvalResult};
use crate::grid::Grid;
use crate::group::{Group, GroupBuilder};
use crate::parameter::{Parameter, ParameterCatalog};

/// Receives configuration errors that should not abort the whole model.
pub type ErrorSink<'a> = &'a mut dyn FnMut(ConfigError);

/// Construction phase: parameters first, then groups.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    content: ContentType,
    metadata: BTreeMap<String, String>,
    catalog: ParameterCatalog,
    groups: Vec<GroupBuilder>,
}

impl ModelBuilder {
    pub fn new(content: ContentType) -> Self {
        Self {
            content,
            metadata: BTreeMap::new(),
            catalog: ParameterCatalog::new(),
            groups: Vec::new(),
        }
    }

    pub fn content(&self) -> ContentType {
        self.content
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> ConfigResult<ParamId> {
        self.catalog.add(parameter)
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn add_group(&mut self, group: GroupBuilder) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[GroupBuilder] {
        &self.groups
    }

    /// Configure every group and freeze the model.
    ///
    /// Without a sink the first configuration error aborts. With one, the
    /// failing group is reported to it and left out of the model.
    pub fn configure(
        self,
        policy: &dyn ParameterSetPolicy,
        mut sink: Option<ErrorSink<'_>>,
    ) -> ConfigResult<Model> {
        let ModelBuilder {
            content,
            metadata,
            mut catalog,
            groups: builders,
        } = self;
        catalog.assign_parameter_sets(|name| policy.parameter_set(content, name));
        let mut groups = Vec::with_capacity(builders.len());
        for builder in builders {
            let name = builder.name().to_string();
            match builder.configure(groups.len(), &catalog, content, policy) {
                Ok(group) => groups.push(group),
                Err(err) => match sink.as_deref_mut() {
                    Some(sink) => {
                        warn!(group = %name, error = %err, "group excluded from model");
                        sink(err);
                    }
                    None => return Err(err),
                },
            }
        }
        info!(
            content = %content,
            groups = groups.len(),
            parameters = catalog.len(),
            "model configured"
        );
        Ok(Model {
            content,
            metadata,
            catalog,
            groups,
            contributing: Memo::new(),
        })
    }
}

/// A configured, query-only GGXF model.
#[derive(Debug, Clone)]
pub struct Model {
    content: ContentType,
    metadata: BTreeMap<String, String>,
    catalog: ParameterCatalog,
    groups: Vec<Group>,
    contributing: Memo<(Real, Option<Real>), Arc<[usize]>>,
}

impl Model {
    pub fn content(&self) -> ContentType {
        self.content
    }

    pub fn needs_epoch(&self) -> bool {
        self.content.needs_epoch()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.catalog.parameters()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    /// Every grid of every group, depth-first within each group.
    pub fn grids(&self) -> impl Iterator<Item = (&Group, &Grid)> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.all_grids().into_iter().map(move |grid| (group, grid)))
    }

    /// Evaluate all parameters at `xy`.
    ///
    /// The result follows catalog order. `Ok(None)` only comes from the
    /// single-group path when the point is outside every grid; with several
    /// groups, uncovered positions read zero.
    pub fn evaluate(
        &self,
        xy: (Real, Real),
        epoch: Option<Real>,
        reference_epoch: Option<Real>,
    ) -> EvalResult<Option<Vec<Real>>> {
        let xy = ensure_finite_xy(xy)?;
        if self.needs_epoch() && epoch.is_none() {
            return Err(EvalError::EpochRequired {
                content: self.content,
            });
        }
        if let [group] = self.groups.as_slice() {
            return group.evaluate(xy, epoch, reference_epoch);
        }

        let mut total = vec![0.0; self.catalog.len()];
        let mut add = |group: &Group| -> EvalResult<()> {
            if let Some(value) = group.evaluate(xy, epoch, reference_epoch)? {
                total.iter_mut().zip(value).for_each(|(t, v)| *t += v);
            }
            Ok(())
        };
        match self.contributing_groups(epoch, reference_epoch)? {
            Some(active) => {
                debug!(groups = active.len(), ?epoch, "groups with non-zero time factor");
                for &slot in active.iter() {
                    add(&self.groups[slot])?;
                }
            }
            None => {
                for group in &self.groups {
                    add(group)?;
                }
            }
        }
        Ok(Some(total))
    }

    /// Groups with a defined, non-zero time factor at this epoch pair.
    ///
    /// `None` when the content has no time dependence and every group counts.
    fn contributing_groups(
        &self,
        epoch: Option<Real>,
        reference_epoch: Option<Real>,
    ) -> EvalResult<Option<Arc<[usize]>>> {
        let Some(epoch) = epoch.filter(|_| self.needs_epoch()) else {
            return Ok(None);
        };
        self.contributing
            .try_get_or_insert_with((epoch, reference_epoch), || -> EvalResult<Arc<[usize]>> {
                let mut active = Vec::new();
                for (slot, group) in self.groups.iter().enumerate() {
                    if let Some(factor) = group.time_factor(Some(epoch), reference_epoch)? {
                        if factor != 0.0 {
                            active.push(slot);
                        }
                    }
                }
                Ok(Arc::from(active))
            })
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AnyParameterSet, GgxfContentRules};
    use crate::grid::{GridData, GridSpec};
    use crate::interp::InterpolationMethod;
    use ggxf_time::{BaseTimeFunction, CompoundTimeFunction};

    fn flat_spec(name: &str, n_param: usize, values: &[Real]) -> GridSpec {
        let data = GridData::from_fn((2, 2, n_param), |_, _, p| values[p]);
        GridSpec::new(name, [0.0, 10.0, 0.0, 0.0, 0.0, 10.0], (2, 2), data)
    }

    fn group(name: &str, params: &[&str], values: &[Real]) -> GroupBuilder {
        let mut g = GroupBuilder::new(name, params.iter().copied(), InterpolationMethod::Bilinear);
        g.add_grid(flat_spec(&format!("{name}-grid"), params.len(), values), None)
            .unwrap();
        g
    }

    fn velocity(rate: Real) -> CompoundTimeFunction {
        let mut tf = CompoundTimeFunction::new();
        tf.add_function(BaseTimeFunction::velocity(2000.0, rate));
        tf
    }

    #[test]
    fn disjoint_groups_fill_catalog_positions() {
        let mut builder = ModelBuilder::new(ContentType::VelocityModel);
        for name in ["velocityEast", "velocityNorth", "velocityUp"] {
            builder.add_parameter(Parameter::new(name)).unwrap();
        }
        builder.add_group(group("up", &["velocityUp"], &[3.0]));
        builder.add_group(group("horizontal", &["velocityNorth", "velocityEast"], &[2.0, 1.0]));
        let model = builder.configure(&GgxfContentRules, None).unwrap();
        assert_eq!(
            model.evaluate((5.0, 5.0), None, None).unwrap(),
            Some(vec![1.0, 2.0, 3.0])
        );
        // outside every grid the multi-group path gives zeros
        assert_eq!(
            model.evaluate((50.0, 5.0), None, None).unwrap(),
            Some(vec![0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn single_group_reports_no_coverage() {
        let mut builder = ModelBuilder::new(ContentType::GeoidModel);
        builder.add_parameter(Parameter::new("geoidHeight")).unwrap();
        builder.add_group(group("geoid", &["geoidHeight"], &[30.0]));
        let model = builder.configure(&GgxfContentRules, None).unwrap();
        assert_eq!(model.evaluate((5.0, 5.0), None, None).unwrap(), Some(vec![30.0]));
        assert_eq!(model.evaluate((-1.0, 5.0), None, None).unwrap(), None);
        assert!(matches!(
            model.evaluate((Real::NAN, 5.0), None, None),
            Err(EvalError::InvalidPoint(_))
        ));
    }

    #[test]
    fn epoch_is_required_for_deformation() {
        let mut builder = ModelBuilder::new(ContentType::DeformationModel);
        builder.add_parameter(Parameter::new("displacementUp")).unwrap();
        builder.add_group(group("up", &["displacementUp"], &[1.0]).with_time_function(velocity(1.0)));
        let model = builder.configure(&GgxfContentRules, None).unwrap();
        assert_eq!(
            model.evaluate((5.0, 5.0), None, None),
            Err(EvalError::EpochRequired {
                content: ContentType::DeformationModel
            })
        );
        assert_eq!(
            model.evaluate((5.0, 5.0), Some(2010.0), None).unwrap(),
            Some(vec![10.0])
        );
    }

    #[test]
    fn groups_sum_and_zero_factor_groups_are_skipped() {
        let mut builder = ModelBuilder::new(ContentType::DeformationModel);
        builder.add_parameter(Parameter::new("displacementUp")).unwrap();
        builder.add_group(group("steady", &["displacementUp"], &[1.0]).with_time_function(velocity(1.0)));
        let mut quake = CompoundTimeFunction::new();
        quake.add_function(BaseTimeFunction::step(2010.0, 1.0));
        builder.add_group(group("quake", &["displacementUp"], &[-4.0]).with_time_function(quake));
        let model = builder.configure(&GgxfContentRules, None).unwrap();

        assert_eq!(model.evaluate((5.0, 5.0), Some(2005.0), None).unwrap(), Some(vec![5.0]));
        assert_eq!(model.contributing.lookup((2005.0, None)).as_deref(), Some(&[0][..]));
        assert_eq!(model.evaluate((5.0, 5.0), Some(2012.0), None).unwrap(), Some(vec![8.0]));
        assert_eq!(model.contributing.lookup((2012.0, None)).as_deref(), Some(&[0, 1][..]));
        assert_eq!(
            model.evaluate((5.0, 5.0), Some(2012.0), Some(2011.0)).unwrap(),
            Some(vec![1.0])
        );
    }

    #[test]
    fn sink_collects_errors_and_drops_group() {
        let mut builder = ModelBuilder::new(ContentType::GeoidModel);
        builder.add_parameter(Parameter::new("geoidHeight")).unwrap();
        builder.add_parameter(Parameter::new("heightOffset")).unwrap();
        builder.add_group(group("bad", &["heightOffset"], &[1.0]));
        builder.add_group(group("missing", &["undulation"], &[1.0]));
        builder.add_group(group("good", &["geoidHeight"], &[2.0]));

        let strict = builder.clone().configure(&GgxfContentRules, None);
        assert!(matches!(strict, Err(ConfigError::DisallowedParameters { .. })));

        let mut errors = Vec::new();
        let mut sink = |err: ConfigError| errors.push(err);
        let model = builder.configure(&GgxfContentRules, Some(&mut sink)).unwrap();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[1], ConfigError::UnknownParameter { .. }));
        assert_eq!(model.groups().len(), 1);
        assert_eq!(model.groups()[0].name(), "good");
        assert_eq!(model.evaluate((5.0, 5.0), None, None).unwrap(), Some(vec![2.0, 0.0]));
    }

    #[test]
    fn empty_model_returns_zero_vector() {
        let mut builder = ModelBuilder::new(ContentType::GeoidModel);
        builder.add_parameter(Parameter::new("geoidHeight")).unwrap();
        let model = builder.configure(&AnyParameterSet, None).unwrap();
        assert_eq!(model.evaluate((0.0, 0.0), None, None).unwrap(), Some(vec![0.0]));
        assert_eq!(model.grids().count(), 0);
    }
}
