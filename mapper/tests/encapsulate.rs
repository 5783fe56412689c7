//! Flattening nested source graphs and rebuilding nested target graphs

#![allow(clippy::expect_used)]

mod common;

use beanmapper::Bean;
use beanmapper::BeanMapper;

#[derive(Bean, Default)]
struct Country {
    country_name: String,
}

#[derive(Bean, Default)]
struct Address {
    street:  String,
    number:  i32,
    country: Country,
}

#[derive(Bean, Default)]
struct House {
    name:    String,
    address: Address,
}

fn create_house() -> House {
    House {
        name:    "housename".to_string(),
        address: Address {
            street:  "denneweg".to_string(),
            number:  1,
            country: Country {
                country_name: "Nederland".to_string(),
            },
        },
    }
}

#[derive(Bean, Default)]
struct ResultCountry {
    country_name: String,
}

#[derive(Bean, Default)]
struct ResultAddress {
    street:  String,
    number:  i32,
    country: Option<ResultCountry>,
}

#[derive(Bean, Default)]
struct ResultManyToMany {
    name:                 String,
    #[bean(name = "address")]
    address_of_the_house: Option<ResultAddress>,
}

#[test]
fn encapsulate_many_to_many() {
    common::init_tracing();

    let result: ResultManyToMany = BeanMapper::new().map(&create_house()).expect("mappable");
    let address = result
        .address_of_the_house
        .expect("intermediate address is constructed");
    let country = address.country.expect("intermediate country is constructed");

    assert_eq!(result.name, "housename");
    assert_eq!(address.street, "denneweg");
    assert_eq!(address.number, 1);
    assert_eq!(country.country_name, "Nederland");
}

#[derive(Bean, Default)]
struct ResultManyToOne {
    name:         String,
    #[bean(name = "address.street")]
    street:       String,
    #[bean(name = "address.number")]
    number:       i32,
    #[bean(name = "address.country.country_name")]
    country_name: String,
}

#[test]
fn encapsulate_many_to_one() {
    common::init_tracing();

    let result: ResultManyToOne = BeanMapper::new().map(&create_house()).expect("mappable");
    assert_eq!(result.name, "housename");
    assert_eq!(result.street, "denneweg");
    assert_eq!(result.number, 1);
    assert_eq!(result.country_name, "Nederland");
}

#[derive(Bean, Default)]
struct ResultOneToMany {
    #[bean(unwrap)]
    result_country: Option<ResultCountry>,
}

#[test]
fn encapsulate_one_to_many() {
    common::init_tracing();

    let country = Country {
        country_name: "Nederland".to_string(),
    };

    let result: ResultOneToMany = BeanMapper::new().map(&country).expect("mappable");
    let result_country = result
        .result_country
        .expect("encapsulated bean is constructed");
    assert_eq!(result_country.country_name, "Nederland");
}

#[derive(Bean, Default)]
struct Car {
    brand:  String,
    wheels: i32,
}

#[derive(Bean, Default)]
struct Driver {
    name:         String,
    #[bean(unwrap)]
    car:          Car,
    #[bean(name = "monteur.name")]
    monteur_name: String,
}

#[derive(Bean, Default)]
struct Monteur {
    name: String,
}

#[derive(Bean, Default)]
struct CarDriver {
    name:    String,
    brand:   String,
    wheels:  i32,
    monteur: Option<Monteur>,
}

#[test]
fn source_annotated() {
    common::init_tracing();

    let driver = Driver {
        name:         "driverName".to_string(),
        car:          Car {
            brand:  "Opel".to_string(),
            wheels: 4,
        },
        monteur_name: "monteur".to_string(),
    };

    let target: CarDriver = BeanMapper::new().map(&driver).expect("mappable");
    assert_eq!(target.name, "driverName");
    assert_eq!(target.brand, "Opel");
    assert_eq!(target.wheels, 4);
    assert_eq!(
        target.monteur.expect("monteur is built from the dotted alias").name,
        "monteur"
    );
}

#[derive(Bean, Default)]
struct PartialHouse {
    name:    String,
    address: Option<Address>,
}

#[test]
fn absent_intermediates_yield_no_value() {
    common::init_tracing();

    let house = PartialHouse {
        name:    "housename".to_string(),
        address: None,
    };

    let result: ResultManyToOne = BeanMapper::new().map(&house).expect("mappable");
    assert_eq!(result.name, "housename");
    assert!(result.street.is_empty());
    assert!(result.country_name.is_empty());

    let result: ResultManyToMany = BeanMapper::new().map(&house).expect("mappable");
    assert!(result.address_of_the_house.is_none());
}

#[derive(Bean, Default)]
struct SparseDriver {
    name:         String,
    #[bean(name = "monteur.name")]
    monteur_name: Option<String>,
}

#[derive(Bean, Default)]
struct OptionalMonteur {
    name: Option<String>,
}

#[derive(Bean, Default)]
struct SparseCarDriver {
    name:    String,
    monteur: Option<OptionalMonteur>,
}

#[test]
fn intermediates_are_only_built_when_written() {
    common::init_tracing();

    let driver = SparseDriver {
        name:         "driverName".to_string(),
        monteur_name: None,
    };
    let target: SparseCarDriver = BeanMapper::new().map(&driver).expect("mappable");
    assert_eq!(target.name, "driverName");
    assert!(target.monteur.is_none());

    let driver = SparseDriver {
        monteur_name: Some("monteur".to_string()),
        ..driver
    };
    let target: SparseCarDriver = BeanMapper::new().map(&driver).expect("mappable");
    assert_eq!(
        target.monteur.and_then(|monteur| monteur.name),
        Some("monteur".to_string())
    );

    let car = Car {
        brand:  "Opel".to_string(),
        wheels: 4,
    };
    let result: ResultOneToMany = BeanMapper::new().map(&car).expect("mappable");
    assert!(result.result_country.is_none());
}
