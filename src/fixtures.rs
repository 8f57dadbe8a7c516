//! Sample models shared by unit tests

use crate::connexion::{Connexion, HttpConnexion, HttpConnexionConfig};
use crate::descriptor::Descriptor;
use crate::hydrator::Hydrator;
use crate::schema::{FieldDef, FieldValue, Group, ModelDef, WireType};
use crate::visitor::Visitor;
use std::sync::Arc;

const READ_WRITE: [Group; 2] = [Group::Read, Group::Write];

pub fn simple() -> ModelDef {
    ModelDef::new("Simple")
        .field(FieldDef::string("id").groups([Group::Read, Group::Write, Group::List]))
        .field(
            FieldDef::string("firstname")
                .groups([Group::Read, Group::Write, Group::List, Group::Required])
                .describe("This is First Name"),
        )
        .field(
            FieldDef::string("lastname")
                .groups([Group::Read, Group::Write, Group::List, Group::Required])
                .describe("This is Last Name"),
        )
        .field(FieldDef::string("email").wire(WireType::Email))
        .field(FieldDef::string("phone").wire(WireType::Phone))
        .field(FieldDef::bool("bool"))
        .field(FieldDef::int("int"))
        .field(FieldDef::float("score"))
        .field(FieldDef::string("website").wire(WireType::Url))
        .field(FieldDef::string("language").wire(WireType::Lang))
        .field(FieldDef::string("currency").wire(WireType::Currency))
        .field(
            FieldDef::string("countryId")
                .wire(WireType::Country)
                .serialized_as("country_id"),
        )
        .field(FieldDef::datetime("date").wire(WireType::Date))
        .field(FieldDef::datetime("datetime"))
        .field(FieldDef::array("price").wire(WireType::Price))
        .field(FieldDef::array("image").wire(WireType::Image).groups([Group::Read]))
        .field(FieldDef::array("file").wire(WireType::File).groups([Group::Read]))
        .field(FieldDef::array("tags"))
        .field(FieldDef::object("address", "Address").groups(READ_WRITE))
        .field(FieldDef::string("secret").groups([Group::Write]))
        .field(FieldDef::string("fullname").computed(|instance| {
            let part = |name: &str| {
                instance
                    .value(name)
                    .and_then(FieldValue::as_json)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            FieldValue::from(format!("{} {}", part("firstname"), part("lastname")))
        }))
}

pub fn address() -> ModelDef {
    ModelDef::new("Address")
        .field(FieldDef::string("street").groups(READ_WRITE))
        .field(FieldDef::string("city").groups(READ_WRITE).label("Location"))
        .field(FieldDef::string("zip").groups([Group::Read]))
}

pub fn list_resource() -> ModelDef {
    ModelDef::new("ListResource")
        .field(FieldDef::string("id").groups([Group::Read, Group::Write, Group::List]))
        .field(
            FieldDef::string("name").groups([Group::Read, Group::Write, Group::List, Group::Required]),
        )
        .field(FieldDef::list("items", "ListItem"))
}

pub fn list_item() -> ModelDef {
    ModelDef::new("ListItem")
        .field(FieldDef::string("name").groups([Group::Read, Group::Write, Group::Required]))
        .field(FieldDef::bool("bool").default_value(false))
        .field(FieldDef::int("int"))
        .field(FieldDef::datetime("datetime"))
        .field(FieldDef::array("price").wire(WireType::Price))
}

pub fn models() -> Vec<ModelDef> {
    vec![simple(), address(), list_resource(), list_item()]
}

pub fn descriptor() -> Arc<Descriptor> {
    Arc::new(Descriptor::from_models(models()).unwrap())
}

pub fn hydrator() -> Hydrator {
    Hydrator::new(descriptor())
}

pub fn connexion(endpoint: &str) -> Arc<dyn Connexion> {
    Arc::new(
        HttpConnexion::new(HttpConnexionConfig::builder().endpoint(endpoint).build()).unwrap(),
    )
}

/// Plain JSON visitor talking to `endpoint`
pub fn visitor(endpoint: &str, model: &str) -> Visitor {
    Visitor::json(connexion(endpoint), hydrator(), model).unwrap()
}

/// JSON-HAL visitor talking to `endpoint`
pub fn hal_visitor(endpoint: &str, model: &str) -> Visitor {
    Visitor::hal(connexion(endpoint), hydrator(), model).unwrap()
}
