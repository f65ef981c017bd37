//! Structural encoder: flattens a [`FormValue`] tree into a multipart [`Form`].
//!
//! Field names use `.` between nested object levels and `[index]` for array
//! elements. Object segments are snake-cased, indices are kept as digits.
//! Null values, empty arrays and empty objects produce no entry at all, so
//! the server can tell "not sent" apart from "cleared".
//!
//! # Example
//!
//! ```
//! use casewire_core::{FormEntry, FormValue, encode_form_data};
//! use serde_json::json;
//!
//! let value = FormValue::from(json!({ "user": { "tags": ["admin"] } }));
//! let form = encode_form_data(&value, None, None);
//!
//! assert_eq!(form.entries(), vec![("user.tags[0]", FormEntry::Text("admin"))]);
//! ```

use crate::case::to_snake;
use crate::value::number_to_string;
use crate::{Form, FormValue, Part};

/// Encode `value` into `form` (or a fresh form) under `key_prefix`.
///
/// Returns the same accumulator so encoding can continue across calls.
#[must_use]
pub fn encode_form_data(value: &FormValue, form: Option<Form>, key_prefix: Option<&str>) -> Form {
    let mut form = form.unwrap_or_default();
    append_value(&mut form, value, key_prefix);
    form
}

fn append_value(form: &mut Form, value: &FormValue, key_prefix: Option<&str>) {
    let key_prefix = key_prefix.filter(|prefix| !prefix.is_empty());
    match value {
        FormValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let key = match key_prefix {
                    Some(prefix) => format!("{prefix}[{index}]"),
                    None => index.to_string(),
                };
                append_child(form, item, &key);
            }
        }
        FormValue::Object(fields) => {
            for (name, child) in fields {
                let name = to_snake(name);
                let key = match key_prefix {
                    Some(prefix) => format!("{prefix}.{name}"),
                    None => name,
                };
                append_child(form, child, &key);
            }
        }
        primitive => {
            if let Some(prefix) = key_prefix {
                append_primitive(form, prefix, primitive);
            }
        }
    }
}

fn append_child(form: &mut Form, child: &FormValue, key: &str) {
    match child {
        FormValue::Null => {}
        FormValue::Array(items) if items.is_empty() => {}
        FormValue::Object(fields) if fields.is_empty() => {}
        FormValue::Array(_) | FormValue::Object(_) => append_value(form, child, Some(key)),
        primitive => append_primitive(form, key, primitive),
    }
}

fn append_primitive(form: &mut Form, key: &str, value: &FormValue) {
    match value {
        FormValue::Bool(flag) => form.push(Part::text(key, if *flag { "true" } else { "false" })),
        FormValue::Number(number) => form.push(Part::text(key, number_to_string(number))),
        FormValue::String(text) => form.push(Part::text(key, text.as_str())),
        FormValue::File(blob) => form.push(Part::blob(key, blob)),
        FormValue::Null | FormValue::Array(_) | FormValue::Object(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Blob, FormEntry};

    fn encode(value: serde_json::Value) -> Form {
        encode_form_data(&FormValue::from(value), None, None)
    }

    fn texts(form: &Form) -> Vec<(&str, &str)> {
        form.entries()
            .into_iter()
            .map(|(key, entry)| match entry {
                FormEntry::Text(text) => (key, text),
                FormEntry::File(_) => (key, "<file>"),
            })
            .collect()
    }

    #[test]
    fn string_array_is_not_split_into_characters() {
        let form = encode(json!({ "foo": ["bar"] }));
        assert_eq!(texts(&form), vec![("foo[0]", "bar")]);
    }

    #[test]
    fn array_of_primitives_in_order() {
        let form = encode(json!({ "ids": ["a", "b", "c"] }));
        assert_eq!(
            texts(&form),
            vec![("ids[0]", "a"), ("ids[1]", "b"), ("ids[2]", "c")]
        );
    }

    #[test]
    fn mixed_array() {
        let form = encode(json!({ "mixed": ["string", 42, true, "another string"] }));
        assert_eq!(
            texts(&form),
            vec![
                ("mixed[0]", "string"),
                ("mixed[1]", "42"),
                ("mixed[2]", "true"),
                ("mixed[3]", "another string"),
            ]
        );
    }

    #[test]
    fn array_with_nulls_stays_sparse() {
        let value = FormValue::object([(
            "arrayWithNulls",
            FormValue::Array(vec![
                "valid".into(),
                FormValue::Null,
                FormValue::from(None::<String>),
                "another valid".into(),
            ]),
        )]);
        let form = encode_form_data(&value, None, None);
        assert_eq!(
            texts(&form),
            vec![
                ("array_with_nulls[0]", "valid"),
                ("array_with_nulls[3]", "another valid"),
            ]
        );
    }

    #[test]
    fn nested_objects_are_dotted_and_snake_cased() {
        let form = encode(json!({ "user": { "tags": ["admin"] } }));
        assert_eq!(texts(&form), vec![("user.tags[0]", "admin")]);

        let form = encode(json!({
            "headOfHousehold": { "fullName": "Jane", "birthDate": "1990-01-01" },
        }));
        assert_eq!(
            texts(&form),
            vec![
                ("head_of_household.full_name", "Jane"),
                ("head_of_household.birth_date", "1990-01-01"),
            ]
        );
    }

    #[test]
    fn empty_collections_and_nulls_are_omitted() {
        let form = encode(json!({
            "emptyList": [],
            "emptyObject": {},
            "missing": null,
            "nested": { "alsoMissing": null },
            "kept": "yes",
        }));
        assert_eq!(texts(&form), vec![("kept", "yes")]);
    }

    #[test]
    fn booleans_are_literal_strings() {
        let form = encode(json!({ "isActive": true, "flags": [false] }));
        assert_eq!(
            texts(&form),
            vec![("is_active", "true"), ("flags[0]", "false")]
        );
    }

    #[test]
    fn array_of_objects_and_nested_arrays() {
        let form = encode(json!({
            "members": [
                { "role": "HEAD", "documents": [{ "docType": "NID" }] },
                { "role": "SON" },
            ],
            "matrix": [[1, 2], []],
        }));
        assert_eq!(
            texts(&form),
            vec![
                ("members[0].role", "HEAD"),
                ("members[0].documents[0].doc_type", "NID"),
                ("members[1].role", "SON"),
                ("matrix[0][0]", "1"),
                ("matrix[0][1]", "2"),
            ]
        );
    }

    #[test]
    fn array_indices_are_not_case_converted() {
        let form = encode(json!({ "ageGroup05": ["x"] }));
        assert_eq!(texts(&form), vec![("age_group_0_5[0]", "x")]);
    }

    #[test]
    fn files_keep_identity() {
        let photo = Blob::file("photo.jpg", vec![0xFF, 0xD8, 0xFF]);
        let value = FormValue::object([
            ("photo", FormValue::from(photo.clone())),
            ("attachments", FormValue::array([photo.clone()])),
        ]);

        let form = encode_form_data(&value, None, None);

        assert_eq!(form.len(), 2);
        for (part, expected) in form.parts().iter().zip(["photo", "attachments[0]"]) {
            assert_eq!(part.name(), expected);
            assert!(part.is_file());
            assert!(photo.same_data(part.data()));
        }
    }

    #[test]
    fn primitive_with_prefix() {
        let form = encode_form_data(&FormValue::Bool(false), None, Some("consent"));
        assert_eq!(texts(&form), vec![("consent", "false")]);

        let form = encode_form_data(&FormValue::from(12.0), None, Some("size"));
        assert_eq!(texts(&form), vec![("size", "12")]);
    }

    #[test]
    fn primitive_without_prefix_or_null_appends_nothing() {
        assert!(encode_form_data(&FormValue::from("orphan"), None, None).is_empty());
        assert!(encode_form_data(&FormValue::Null, None, Some("key")).is_empty());
    }

    #[test]
    fn root_array_without_prefix_uses_bare_index() {
        let form = encode(json!(["a", "b"]));
        assert_eq!(texts(&form), vec![("0", "a"), ("1", "b")]);
    }

    #[test]
    fn prefix_applies_to_object_children() {
        let form = encode_form_data(
            &FormValue::from(json!({ "fullName": "Jane" })),
            None,
            Some("individual"),
        );
        assert_eq!(texts(&form), vec![("individual.full_name", "Jane")]);
    }

    #[test]
    fn empty_prefix_counts_as_no_prefix() {
        let form = encode_form_data(
            &FormValue::from(json!({ "fullName": "Jane", "ids": [7] })),
            None,
            Some(""),
        );
        assert_eq!(texts(&form), vec![("full_name", "Jane"), ("ids[0]", "7")]);
    }

    #[test]
    fn extreme_numbers_use_exponent_form() {
        let form = encode(json!({ "n": 1e21, "m": 1e-7 }));
        assert_eq!(texts(&form), vec![("n", "1e+21"), ("m", "1e-7")]);
    }

    #[test]
    fn accumulates_into_existing_form() {
        let form = encode_form_data(&FormValue::from(json!({ "a": 1 })), None, None);
        let form = encode_form_data(&FormValue::from(json!({ "b": 2 })), Some(form), None);
        assert_eq!(texts(&form), vec![("a", "1"), ("b", "2")]);
    }
}
