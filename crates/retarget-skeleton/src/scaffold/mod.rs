//! Synthetic skeleton built from a mapping document alone.
//!
//! The result always contains the humanoid template plus every recognized
//! bone the mapping refers to. Bones the template does not cover are parented
//! by keyword and placed on a golden-angle spiral, so the same mapping always
//! yields bit-identical positions.

mod rules;
mod template;

pub use rules::{ParentRule, ScaffoldRules, ScatterParams};

use crate::{SkeletonError, SkeletonGraph, MIN_BONE_LENGTH};
use log::{debug, info, warn};
use nalgebra::Vector3;
use retarget_mapping::{MappingDocument, Side};
use std::collections::HashSet;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum ScaffoldError {
    /// The mapping refers to no recognized bone; `fallback` holds a
    /// single-root skeleton.
    #[error("mapping references no recognized bones")]
    EmptyMapping { fallback: Box<SkeletonGraph> },
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

/// What the builder did with the mapping's bone references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaffoldReport {
    /// References already covered by the template.
    pub placed: Vec<String>,
    /// References added through the scatter, in scatter order.
    pub scattered: Vec<String>,
    /// References dropped by the allow-list.
    pub discarded: Vec<String>,
    /// Links skipped while connecting template chains.
    pub chain_errors: Vec<SkeletonError>,
}

#[derive(Clone, Debug)]
pub struct Scaffold {
    pub skeleton: SkeletonGraph,
    pub report: ScaffoldReport,
}

/// Head and tail of the `index`-th scattered bone.
///
/// `theta = i * pi * (3 - sqrt 5)`, `r = radius * sqrt(i + 1)`; the sign of x
/// follows `side` when there is one.
pub fn scatter_position(
    index: usize,
    side: Option<Side>,
    params: &ScatterParams,
) -> (Vector3<f32>, Vector3<f32>) {
    let i = index as f64;
    let theta = i * std::f64::consts::PI * (3.0 - 5f64.sqrt());
    let r = f64::from(params.radius) * (i + 1.0).sqrt();
    let mut x = (r * theta.cos()) as f32;
    let y = (r * theta.sin()) as f32;
    if let Some(side) = side {
        x = side.place_x(x);
    }
    let head = Vector3::new(x, y, params.z);
    let dz = if params.tail_dz.abs() > f32::EPSILON {
        params.tail_dz
    } else {
        MIN_BONE_LENGTH
    };
    (head, head + Vector3::z() * dz)
}

/// Skeleton holding only the template root.
pub fn fallback_skeleton() -> SkeletonGraph {
    let mut graph = SkeletonGraph::new();
    if let Some(root) = template::humanoid().into_iter().next() {
        // cannot fail on an empty graph
        let _ = graph.add_bone(root.name, root.head, root.tail, None);
    }
    graph
}

/// Builds scaffold skeletons from mapping documents.
#[derive(Clone, Debug, Default)]
pub struct ScaffoldBuilder {
    rules: ScaffoldRules,
}

impl ScaffoldBuilder {
    pub fn new(rules: ScaffoldRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScaffoldRules {
        &self.rules
    }

    /// Build the scaffold for `mapping`.
    ///
    /// Fails with [`ScaffoldError::EmptyMapping`] when no reference survives
    /// the allow-list.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, mapping), fields(entries = mapping.len()))
    )]
    pub fn build(&self, mapping: &MappingDocument) -> Result<Scaffold, ScaffoldError> {
        let mut report = ScaffoldReport::default();
        let mut recognized = Vec::new();
        for name in mapping.referenced_bones() {
            if self.rules.is_allowed(name) {
                recognized.push(name);
            } else {
                debug!("scaffold: ignoring unrecognized bone `{name}`");
                report.discarded.push(name.to_string());
            }
        }
        if recognized.is_empty() {
            warn!("scaffold: mapping has no recognized bones, falling back to a bare root");
            return Err(ScaffoldError::EmptyMapping {
                fallback: Box::new(fallback_skeleton()),
            });
        }

        let template = template::humanoid();
        let template_names: HashSet<&str> = template.iter().map(|b| b.name.as_str()).collect();
        let mut extra = Vec::new();
        for name in recognized {
            if template_names.contains(name) {
                report.placed.push(name.to_string());
            } else {
                extra.push(name);
            }
        }

        let mut skeleton = SkeletonGraph::new();
        for spec in &template {
            skeleton.add_bone(
                spec.name.clone(),
                spec.head,
                spec.tail,
                spec.parent.as_deref(),
            )?;
        }

        for (index, name) in extra.into_iter().enumerate() {
            let resolved = self.rules.names.resolve(name);
            let (head, tail) = scatter_position(index, resolved.side, &self.rules.scatter);
            let parent = self.pick_parent(&skeleton, &resolved.base, resolved.side);
            debug!("scaffold: scatter #{index} `{name}` under `{parent}`");
            skeleton.add_bone(name, head, tail, Some(&parent))?;
            report.scattered.push(name.to_string());
        }

        for chain in template::chains() {
            let links: Vec<&str> = chain.iter().map(String::as_str).collect();
            report.chain_errors.extend(skeleton.connect_chain(&links));
        }

        info!(
            "scaffold: {} bones ({} from mapping, {} scattered, {} ignored)",
            skeleton.len(),
            report.placed.len() + report.scattered.len(),
            report.scattered.len(),
            report.discarded.len()
        );
        Ok(Scaffold { skeleton, report })
    }

    /// Like [`Self::build`] but returns the single-root fallback instead of
    /// an empty-mapping error.
    pub fn build_or_fallback(&self, mapping: &MappingDocument) -> Result<Scaffold, ScaffoldError> {
        match self.build(mapping) {
            Err(ScaffoldError::EmptyMapping { fallback }) => Ok(Scaffold {
                skeleton: *fallback,
                report: ScaffoldReport {
                    discarded: mapping
                        .referenced_bones()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    ..ScaffoldReport::default()
                },
            }),
            other => other,
        }
    }

    fn pick_parent(&self, skeleton: &SkeletonGraph, base: &str, side: Option<Side>) -> String {
        let wanted = self.rules.parent_for(base, side);
        if skeleton.contains(&wanted) {
            return wanted;
        }
        warn!("scaffold: parent `{wanted}` does not exist, using `{}`", self.rules.default_parent);
        if skeleton.contains(&self.rules.default_parent) {
            self.rules.default_parent.clone()
        } else {
            "root".to_string()
        }
    }
}

/// Build with the default rules.
pub fn build_scaffold(mapping: &MappingDocument) -> Result<Scaffold, ScaffoldError> {
    ScaffoldBuilder::default().build(mapping)
}
