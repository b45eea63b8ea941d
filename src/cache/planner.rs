//! Consumption plan generation.
//!
//! Folds a batch of cache events into the minimal set of invalidation targets.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use sitedesk_api_types::SingletonKind;
use uuid::Uuid;

use super::events::{CacheEvent, EventKind};
use super::keys::InvalidationTarget;

#[derive(Debug, Default)]
pub struct ConsumptionPlan {
    /// Targets to invalidate; no target is subsumed by another.
    pub targets: Vec<InvalidationTarget>,
    /// Flush every cached response regardless of targets.
    pub invalidate_all: bool,
    /// Distinct events folded into this plan.
    pub event_count: usize,
}

impl fmt::Display for ConsumptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConsumptionPlan {{ events: {}, invalidate_all: {}, targets: [",
            self.event_count, self.invalidate_all
        )?;
        for (index, target) in self.targets.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{target}")?;
        }
        f.write_str("] }")
    }
}

impl ConsumptionPlan {
    /// Merge events into a plan.
    ///
    /// Duplicate event ids are folded once. Exact targets that fall under a
    /// layout target in the same batch are dropped.
    pub fn from_events(events: Vec<CacheEvent>) -> Self {
        let mut seen_ids = HashSet::new();
        let mut collected = BTreeSet::new();
        let mut event_count = 0;

        for event in events {
            if !seen_ids.insert(event.id) {
                continue;
            }
            event_count += 1;
            collected.extend(targets_for(&event.kind));
        }

        let targets = collected
            .iter()
            .filter(|target| {
                !collected
                    .iter()
                    .any(|other| other != *target && other.subsumes(target))
            })
            .cloned()
            .collect();

        Self {
            targets,
            invalidate_all: false,
            event_count,
        }
    }

    /// Plan for a queue that lost events: everything must go.
    pub fn flush_all(mut self) -> Self {
        self.invalidate_all = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && !self.invalidate_all
    }
}

/// Pages made stale by one committed write.
pub fn targets_for(kind: &EventKind) -> Vec<InvalidationTarget> {
    match kind {
        EventKind::SingletonUpserted { kind } | EventKind::SingletonReset { kind } => {
            singleton_targets(*kind)
        }
        EventKind::ProductCreated { .. } => product_list_targets(),
        EventKind::ProductUpdated { id } => {
            let mut targets = product_list_targets();
            targets.push(InvalidationTarget::exact(product_path(*id)));
            targets.push(InvalidationTarget::exact(format!(
                "/dashboard{}",
                product_path(*id)
            )));
            targets
        }
        EventKind::ProductDeleted { id } => vec![
            InvalidationTarget::exact("/"),
            InvalidationTarget::exact("/products"),
            InvalidationTarget::exact(product_path(*id)),
            InvalidationTarget::layout("/dashboard"),
        ],
        EventKind::Paths(targets) => targets.clone(),
    }
}

fn singleton_targets(kind: SingletonKind) -> Vec<InvalidationTarget> {
    match kind {
        SingletonKind::Shared | SingletonKind::Homepage => vec![
            InvalidationTarget::exact("/"),
            InvalidationTarget::layout("/dashboard"),
        ],
        SingletonKind::Aboutus => vec![
            InvalidationTarget::exact("/"),
            InvalidationTarget::exact("/about-us"),
            InvalidationTarget::exact("/dashboard/about-us"),
        ],
    }
}

fn product_list_targets() -> Vec<InvalidationTarget> {
    vec![
        InvalidationTarget::exact("/"),
        InvalidationTarget::exact("/products"),
        InvalidationTarget::exact("/dashboard/products"),
    ]
}

fn product_path(id: Uuid) -> String {
    format!("/products/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind) -> CacheEvent {
        CacheEvent::new(kind, 0)
    }

    fn rendered(plan: &ConsumptionPlan) -> Vec<String> {
        plan.targets.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_batch_yields_empty_plan() {
        let plan = ConsumptionPlan::from_events(Vec::new());
        assert!(plan.is_empty());
        assert_eq!(plan.event_count, 0);
    }

    #[test]
    fn aboutus_write_targets_its_pages() {
        let plan = ConsumptionPlan::from_events(vec![event(EventKind::SingletonUpserted {
            kind: SingletonKind::Aboutus,
        })]);

        assert_eq!(
            rendered(&plan),
            vec!["/", "/about-us", "/dashboard/about-us"]
        );
    }

    #[test]
    fn layout_scope_absorbs_exact_dashboard_paths() {
        let id = Uuid::new_v4();
        let plan = ConsumptionPlan::from_events(vec![
            event(EventKind::ProductUpdated { id }),
            event(EventKind::SingletonUpserted {
                kind: SingletonKind::Homepage,
            }),
        ]);

        assert_eq!(
            rendered(&plan),
            vec![
                "/".to_string(),
                "/products".to_string(),
                format!("/products/{id}"),
                "/dashboard (layout)".to_string(),
            ]
        );
    }

    #[test]
    fn duplicate_event_ids_are_folded_once() {
        let first = event(EventKind::ProductCreated { id: Uuid::new_v4() });
        let plan = ConsumptionPlan::from_events(vec![first.clone(), first]);

        assert_eq!(plan.event_count, 1);
        assert_eq!(plan.targets.len(), 3);
    }

    #[test]
    fn product_delete_targets_list_detail_and_dashboard_layout() {
        let id = Uuid::new_v4();
        let targets = targets_for(&EventKind::ProductDeleted { id });

        assert!(targets.contains(&InvalidationTarget::exact(format!("/products/{id}"))));
        assert!(targets.contains(&InvalidationTarget::layout("/dashboard")));
        assert!(!targets.contains(&InvalidationTarget::exact(format!(
            "/dashboard/products/{id}"
        ))));
    }

    #[test]
    fn flush_all_is_never_empty() {
        let plan = ConsumptionPlan::from_events(Vec::new()).flush_all();
        assert!(!plan.is_empty());
        assert!(plan.to_string().contains("invalidate_all: true"));
    }
}
