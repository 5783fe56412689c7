//! Properties inherited from an embedded ancestor map like declared ones

#![allow(clippy::expect_used)]

mod common;

use beanmapper::Bean;
use beanmapper::BeanClass;
use beanmapper::BeanMapper;
use beanmapper::properties_of;

#[derive(Bean, Default)]
struct AbstractEntity {
    id:   i64,
    name: String,
}

#[derive(Bean, Default)]
struct Source {
    #[bean(parent)]
    entity:       AbstractEntity,
    street:       String,
    house_number: i32,
}

#[derive(Bean, Default)]
struct AbstractTarget {
    id: i64,
}

#[derive(Bean, Default)]
struct Target {
    #[bean(parent)]
    base:         AbstractTarget,
    name:         String,
    street:       String,
    house_number: i32,
}

#[test]
fn parent_class() {
    common::init_tracing();

    let source = Source {
        entity:       AbstractEntity {
            id:   1,
            name: "abstractName".to_string(),
        },
        street:       "street".to_string(),
        house_number: 42,
    };

    let target: Target = BeanMapper::new().map(&source).expect("mappable");
    assert_eq!(target.base.id, 1);
    assert_eq!(target.name, "abstractName");
    assert_eq!(target.street, "street");
    assert_eq!(target.house_number, 42);
}

#[test]
fn parent_class_reversed() {
    common::init_tracing();

    let target = Target {
        base:         AbstractTarget { id: 1 },
        name:         "abstractName".to_string(),
        street:       "street".to_string(),
        house_number: 42,
    };

    let source: Source = BeanMapper::new().map(&target).expect("mappable");
    assert_eq!(source.entity.id, 1);
    assert_eq!(source.entity.name, "abstractName");
    assert_eq!(source.street, "street");
    assert_eq!(source.house_number, 42);
}

#[test]
fn ancestor_properties_are_listed_first() {
    let names: Vec<&str> = properties_of(Target::class())
        .iter()
        .map(|descriptor| descriptor.name)
        .collect();
    assert_eq!(names, vec!["id", "name", "street", "house_number"]);

    let source = Source::default();
    let bean: &dyn beanmapper::Bean = &source;
    assert!(bean.property("id").is_some());
    assert!(bean.property("entity").is_none());
}
