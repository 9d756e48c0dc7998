//! # Shared Test Fixtures
//!
//! A record and mapping source modelled on an attribute such as
//! `[Generic<T1, T2>(size, level, params tags, name = default) { Values = ..., Description = ... }]`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use paramap::argument::ParameterKey;
use paramap::argument_enum;
use paramap::coerce::adapters;
use paramap::mapper::MappingSource;
use paramap::recorder::{DefaultRecorder, RecorderProvider};
use paramap::repository::{IgnoreCase, MappingRepository, NameComparer, Ordinal};
use paramap::syntax::{ArgumentLocation, Location, Span};
use paramap::value::TypeRef;

argument_enum!(pub struct Level(i32));

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeRecord {
    pub first_type: Option<TypeRef>,
    pub second_type: Option<TypeRef>,
    pub size: Option<i32>,
    pub level: Option<Level>,
    pub tags: Option<Vec<String>>,
    pub name: Option<String>,
    pub name_default_used: bool,
    pub name_location: Option<Location>,
    pub values: Option<Option<Vec<i32>>>,
    pub description: Option<Option<String>>,
    pub description_span: Option<Span>,
}

/// Mappings for [`AttributeRecord`]. Counts how often it is populated.
pub struct AttributeMappings {
    pub ignore_case: bool,
    pub populations: AtomicUsize,
}

impl AttributeMappings {
    pub fn new() -> Self {
        Self {
            ignore_case: false,
            populations: AtomicUsize::new(0),
        }
    }

    pub fn ignoring_case() -> Self {
        Self {
            ignore_case: true,
            populations: AtomicUsize::new(0),
        }
    }

    pub fn population_count(&self) -> usize {
        self.populations.load(Ordering::SeqCst)
    }
}

impl MappingSource<AttributeRecord> for AttributeMappings {
    fn populate(&self, mappings: &mut MappingRepository<AttributeRecord>) -> paramap::Result<()> {
        self.populations.fetch_add(1, Ordering::SeqCst);

        let types = &mut mappings.type_parameters;
        types.add(
            ParameterKey::positional("T1", 1),
            RecorderProvider::semantic(
                adapters::value::<TypeRef>()
                    .semantic_action(|r: &mut AttributeRecord, t| r.first_type = Some(t)),
            ),
        )?;
        types.add(
            ParameterKey::positional("T2", 2),
            RecorderProvider::semantic(
                adapters::value::<TypeRef>()
                    .semantic_action(|r: &mut AttributeRecord, t| r.second_type = Some(t)),
            ),
        )?;

        let constructor = &mut mappings.constructor_parameters;
        constructor.add_normal(
            ParameterKey::positional("size", 0),
            RecorderProvider::semantic(adapters::value::<i32>().semantic(
                |r: &mut AttributeRecord, size| {
                    if size < 0 {
                        return false;
                    }
                    r.size = Some(size);
                    true
                },
            )),
        )?;
        constructor.add_normal(
            ParameterKey::positional("level", 1),
            RecorderProvider::semantic(
                adapters::value::<Level>()
                    .semantic_action(|r: &mut AttributeRecord, level| r.level = Some(level)),
            ),
        )?;
        constructor.add_params(
            ParameterKey::positional("tags", 2),
            RecorderProvider::semantic(
                adapters::collection::<String>()
                    .semantic_action(|r: &mut AttributeRecord, tags| r.tags = Some(tags)),
            ),
        )?;
        let name = adapters::value::<String>();
        constructor.add_optional(
            ParameterKey::positional("name", 3),
            RecorderProvider::adaptive(
                name.combined_action(|r: &mut AttributeRecord, value, location| {
                    r.name = Some(value);
                    r.name_location = Some(location.primary().clone());
                }),
                name.semantic_action(|r: &mut AttributeRecord, value| r.name = Some(value)),
            ),
            DefaultRecorder::located(|r: &mut AttributeRecord, location: &Location| {
                r.name_default_used = true;
                r.name_location = Some(location.clone());
                true
            })
            .with_semantic(|r: &mut AttributeRecord| {
                r.name_default_used = true;
                true
            }),
        )?;

        let named = &mut mappings.named_parameters;
        named.add(
            "Values",
            RecorderProvider::semantic(
                adapters::nullable_collection::<i32>()
                    .semantic_action(|r: &mut AttributeRecord, values| r.values = Some(values)),
            ),
        )?;
        let description = adapters::nullable::<String>();
        named.add(
            "Description",
            RecorderProvider::split(
                description
                    .semantic_action(|r: &mut AttributeRecord, d| r.description = Some(d)),
                Arc::new(|r: &mut AttributeRecord, location: &ArgumentLocation| {
                    r.description_span = Some(location.primary().span);
                    true
                }),
            ),
        )?;
        Ok(())
    }

    fn comparer(&self) -> Arc<dyn NameComparer> {
        if self.ignore_case {
            Arc::new(IgnoreCase)
        } else {
            Arc::new(Ordinal)
        }
    }
}

pub fn value_location(start: usize, end: usize) -> ArgumentLocation {
    ArgumentLocation::Value(Location::new("attribute.cs", Span::new(start, end)))
}

pub fn default_location(at: usize) -> ArgumentLocation {
    ArgumentLocation::Default(Location::new("attribute.cs", Span::new(at, at)))
}
