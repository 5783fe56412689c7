//! Mapping between the person entity, its form and its view

#![allow(clippy::expect_used)]

mod common;

use beanmapper::Bean;
use beanmapper::BeanClass;
use beanmapper::BeanMapper;

#[derive(Bean, Default, Debug, Clone, PartialEq)]
struct Person {
    id:           Option<i64>,
    name:         String,
    place:        String,
    bank_account: String,
}

#[derive(Bean, Default, Debug, PartialEq)]
struct PersonForm {
    name:                 String,
    place:                String,
    bank_account:         String,
    unidentifiable_fluff: String,
}

#[derive(Bean, Default, Debug, PartialEq)]
struct PersonView {
    name:  String,
    place: String,
}

fn create_person() -> Person {
    Person {
        id:           Some(1984),
        name:         "Henk".to_string(),
        place:        "Zoetermeer".to_string(),
        bank_account: "THX-1138-l33t-call".to_string(),
    }
}

fn create_person_form() -> PersonForm {
    PersonForm {
        name:                 "Truus".to_string(),
        place:                "Den Haag".to_string(),
        bank_account:         "XHT-8311-t33l-llac".to_string(),
        unidentifiable_fluff: "0xCAFEBABE".to_string(),
    }
}

#[test]
fn copy_to_new_target_instance() {
    common::init_tracing();

    let view: PersonView = BeanMapper::new()
        .map(&create_person())
        .expect("person maps to its view");

    assert_eq!(view.name, "Henk");
    assert_eq!(view.place, "Zoetermeer");
}

#[test]
fn copy_to_existing_target_instance() {
    common::init_tracing();

    let mut person = create_person();
    let mapped = BeanMapper::new()
        .map_into(&create_person_form(), &mut person)
        .expect("form maps onto the entity");
    mapped.place.push('!');

    assert_eq!(person.id, Some(1984));
    assert_eq!(person.name, "Truus");
    assert_eq!(person.bank_account, "XHT-8311-t33l-llac");
    assert_eq!(person.place, "Den Haag!");
}

#[test]
fn mapping_twice_gives_the_same_result() {
    common::init_tracing();

    let mapper = BeanMapper::new();
    let first: Person = mapper.map(&create_person()).expect("person maps onto itself");
    let second: Person = mapper.map(&create_person()).expect("plans are reused");

    assert_eq!(first, create_person());
    assert_eq!(first, second);
}

#[test]
fn map_all_keeps_source_order() {
    common::init_tracing();

    let mut truus = create_person();
    truus.name = "Truus".to_string();
    let people = [create_person(), truus];

    let views: Vec<PersonView> = BeanMapper::new()
        .map_all(&people)
        .expect("every person maps");

    let names: Vec<&str> = views.iter().map(|view| view.name.as_str()).collect();
    assert_eq!(names, vec!["Henk", "Truus"]);
}

#[test]
fn unmatched_target_properties_are_listed() {
    let mapper = BeanMapper::new();

    assert_eq!(
        mapper.unmatched_properties(PersonForm::class(), Person::class()),
        vec!["id"]
    );
    assert_eq!(
        mapper.unmatched_properties(PersonView::class(), PersonForm::class()),
        vec!["bank_account", "unidentifiable_fluff"]
    );
}

#[test]
fn custom_converters_apply_to_matching_pairs() {
    common::init_tracing();

    #[derive(Bean, Default)]
    struct PersonSummary {
        id:   String,
        name: String,
    }

    let mapper = BeanMapper::builder()
        .converter::<i64, String>(|id| format!("#{id}"))
        .build()
        .expect("default settings are valid");

    let summary: PersonSummary = mapper.map(&create_person()).expect("person maps");
    assert_eq!(summary.id, "#1984");
    assert_eq!(summary.name, "Henk");
}
