//! Hand-written `Record` implementations shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::record::{Element, FieldDescriptor, FieldType, Kind, Record, Schema};
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub given_name: String,
    pub family_name: String,
}

impl Author {
    pub fn new(given: &str, family: &str) -> Self {
        Author {
            given_name: given.into(),
            family_name: family.into(),
        }
    }
}

impl Record for Author {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(
                "Author",
                vec![
                    FieldDescriptor::of::<String>("given_name"),
                    FieldDescriptor::of::<String>("family_name"),
                ],
            )
        })
    }

    fn descriptor(&self) -> &'static Schema {
        Self::schema()
    }

    fn field(&self, name: &str) -> Option<&dyn FieldType> {
        match name {
            "given_name" => Some(&self.given_name),
            "family_name" => Some(&self.family_name),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldType> {
        match name {
            "given_name" => Some(&mut self.given_name),
            "family_name" => Some(&mut self.family_name),
            _ => None,
        }
    }
}

impl Element for Author {
    fn element_kind() -> Kind {
        Kind::Record(Author::schema)
    }

    fn element_value(&self) -> Value<'_> {
        Value::Record(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    pub name: String,
    pub title: String,
    pub author: Option<Author>,
    pub authors: Vec<Author>,
    pub reviews: BTreeMap<String, String>,
    pub items: BTreeMap<i32, String>,
    pub tags: Vec<String>,
    pub page_count: i64,
    pub rating: f64,
    pub in_print: bool,
}

impl Record for Book {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(
                "Book",
                vec![
                    FieldDescriptor::of::<String>("name"),
                    FieldDescriptor::of::<String>("title"),
                    FieldDescriptor::of::<Option<Author>>("author"),
                    FieldDescriptor::of::<Vec<Author>>("authors"),
                    FieldDescriptor::of::<BTreeMap<String, String>>("reviews"),
                    FieldDescriptor::of::<BTreeMap<i32, String>>("items"),
                    FieldDescriptor::of::<Vec<String>>("tags"),
                    FieldDescriptor::of::<i64>("page_count"),
                    FieldDescriptor::of::<f64>("rating"),
                    FieldDescriptor::of::<bool>("in_print"),
                ],
            )
        })
    }

    fn descriptor(&self) -> &'static Schema {
        Self::schema()
    }

    fn field(&self, name: &str) -> Option<&dyn FieldType> {
        match name {
            "name" => Some(&self.name),
            "title" => Some(&self.title),
            "author" => Some(&self.author),
            "authors" => Some(&self.authors),
            "reviews" => Some(&self.reviews),
            "items" => Some(&self.items),
            "tags" => Some(&self.tags),
            "page_count" => Some(&self.page_count),
            "rating" => Some(&self.rating),
            "in_print" => Some(&self.in_print),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldType> {
        match name {
            "name" => Some(&mut self.name),
            "title" => Some(&mut self.title),
            "author" => Some(&mut self.author),
            "authors" => Some(&mut self.authors),
            "reviews" => Some(&mut self.reviews),
            "items" => Some(&mut self.items),
            "tags" => Some(&mut self.tags),
            "page_count" => Some(&mut self.page_count),
            "rating" => Some(&mut self.rating),
            "in_print" => Some(&mut self.in_print),
            _ => None,
        }
    }
}

/// The record most filter tests run against.
pub fn pragmatic() -> Book {
    Book {
        name: "books/1".into(),
        title: "The Pragmatic Programmer".into(),
        author: Some(Author::new("Andrew", "Hunt")),
        authors: vec![Author::new("Andrew", "Hunt"), Author::new("David", "Thomas")],
        reviews: BTreeMap::from([("review1".to_string(), "Classic advice".to_string())]),
        items: BTreeMap::from([(7, "hardcover".to_string())]),
        tags: vec!["software".into(), "Craft".into()],
        page_count: 352,
        rating: 4.5,
        in_print: true,
    }
}
