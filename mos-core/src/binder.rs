//! Projection of a valuation response onto page elements.
//!
//! Field names map to element ids by convention: `key`, `key-i` for list
//! items, and `key-sub` / `key-sub-i` for one level of grouping. Elements
//! that do not exist are skipped and listed in the [`BindReport`].

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::format::{format_text, format_value};

/// What gets written into one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A formatted display value with an optional foreground colour.
    Display { value: String, color: Option<String> },
    /// Plain text; `None` renders as the missing placeholder.
    Text(Option<String>),
    /// Text on a background colour.
    Shaded { text: String, background: String },
}

impl Content {
    /// Text the element ends up showing.
    pub fn visible_text(&self) -> String {
        match self {
            Content::Display { value, .. } => value.clone(),
            Content::Text(text) => format_text(text.as_deref()),
            Content::Shaded { text, .. } => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub id: String,
    pub content: Content,
}

/// The page as seen by the binder.
pub trait BindTarget {
    fn contains(&self, id: &str) -> bool;
    fn apply(&mut self, binding: &Binding);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

impl BindReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Shape of a response field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    List(&'a [Value]),
    Text(Option<&'a str>),
    Display {
        value: &'a Value,
        color: Option<&'a str>,
    },
    Group(&'a Map<String, Value>),
}

impl<'a> Field<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Field::List(items),
            Value::String(s) => Field::Text(Some(s.as_str())),
            Value::Null => Field::Text(None),
            Value::Object(map) if map.contains_key("value") => Field::Display {
                value: &map["value"],
                color: map.get("color").and_then(Value::as_str),
            },
            Value::Object(map) => Field::Group(map),
            // Bare scalars occupy a single element like a display value.
            Value::Number(_) | Value::Bool(_) => Field::Display { value, color: None },
        }
    }
}

/// Content for a single element, or `None` when the value needs more than one element.
pub fn content_of(value: &Value) -> Option<Content> {
    match value {
        Value::Array(_) => None,
        Value::Bool(b) => Some(Content::Text(Some(b.to_string()))),
        Value::String(s) => Some(Content::Text(Some(s.clone()))),
        Value::Null => Some(Content::Text(None)),
        Value::Number(_) => Some(Content::Display {
            value: format_value(value),
            color: None,
        }),
        Value::Object(map) => Some(Content::Display {
            value: format_value(map.get("value").unwrap_or(&Value::Null)),
            color: map.get("color").and_then(Value::as_str).map(str::to_string),
        }),
    }
}

/// Write `data` into `target`, returning what was applied and what had no element.
pub fn load_values(data: &Value, target: &mut dyn BindTarget) -> BindReport {
    let mut report = BindReport::default();
    let Some(fields) = data.as_object() else {
        debug!("valuation response is not an object; nothing to bind");
        return report;
    };
    for (key, value) in fields {
        bind_field(key, value, target, &mut report, true);
    }
    report
}

fn bind_field(
    id: &str,
    value: &Value,
    target: &mut dyn BindTarget,
    report: &mut BindReport,
    allow_group: bool,
) {
    if let Value::Array(items) = value {
        for (i, item) in items.iter().enumerate() {
            let item_id = format!("{id}-{i}");
            match content_of(item) {
                Some(content) => apply(item_id, content, target, report),
                None => skip(item_id, report),
            }
        }
        return;
    }

    if target.contains(id) {
        if let Some(content) = content_of(value) {
            apply(id.to_string(), content, target, report);
        }
        return;
    }

    match Field::classify(value) {
        Field::Group(map) if allow_group => {
            for (sub, sub_value) in map {
                bind_field(&format!("{id}-{sub}"), sub_value, target, report, false);
            }
        }
        _ => skip(id.to_string(), report),
    }
}

fn apply(id: String, content: Content, target: &mut dyn BindTarget, report: &mut BindReport) {
    if !target.contains(&id) {
        skip(id, report);
        return;
    }
    target.apply(&Binding {
        id: id.clone(),
        content,
    });
    report.applied.push(id);
}

fn skip(id: String, report: &mut BindReport) {
    debug!("no element for #{id}");
    report.skipped.push(id);
}

/// Apply already-built bindings, skipping missing elements.
pub fn apply_all(bindings: Vec<Binding>, target: &mut dyn BindTarget) -> BindReport {
    let mut report = BindReport::default();
    for binding in bindings {
        apply(binding.id, binding.content, target, &mut report);
    }
    report
}

// ---------- Declared schema -------------------------------------------------

/// How a declared field is rendered.
///
/// In JSON: `"display"`, `"text"`, `{"list": 3}` or `{"group": [["sales", "display"]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    Display,
    Text,
    /// A list rendered into `len` numbered elements.
    List(usize),
    /// One level of named sub-fields.
    Group(Vec<(String, Renderer)>),
}

impl Renderer {
    fn matches(&self, value: &Value) -> bool {
        match (self, Field::classify(value)) {
            (Renderer::Display, Field::Display { .. }) => true,
            (Renderer::Text, Field::Text(_)) => true,
            (Renderer::List(_), Field::List(_)) => true,
            (Renderer::Group(_), Field::Group(_)) => true,
            _ => false,
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            Renderer::Display => "display",
            Renderer::Text => "text",
            Renderer::List(_) => "list",
            Renderer::Group(_) => "group",
        }
    }
}

fn shape_of(value: &Value) -> &'static str {
    match Field::classify(value) {
        Field::Display { .. } => "display",
        Field::Text(_) => "text",
        Field::List(_) => "list",
        Field::Group(_) => "group",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemaMismatch {
    /// The response carries a field the schema does not declare.
    Undeclared { field: String },
    /// A declared field is absent from the response.
    Missing { field: String },
    Shape {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Explicit field → renderer declarations, checked at configuration time.
///
/// Serialized as an ordered list of `[name, renderer]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<(String, Renderer)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn field(mut self, name: impl Into<String>, renderer: Renderer) -> Self {
        self.fields.push((name.into(), renderer));
        self
    }

    /// Every element id the declared fields bind to.
    pub fn target_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for (name, renderer) in &self.fields {
            collect_ids(name, renderer, &mut ids);
        }
        ids
    }

    /// Declared ids with no element on the page.
    pub fn missing_targets(&self, target: &dyn BindTarget) -> Vec<String> {
        self.target_ids()
            .into_iter()
            .filter(|id| !target.contains(id))
            .collect()
    }

    /// Compare a response against the declarations (top level and one group level).
    pub fn check(&self, data: &Value) -> Vec<SchemaMismatch> {
        let empty = Map::new();
        let fields = data.as_object().unwrap_or(&empty);
        check_level("", &self.fields, fields)
    }
}

fn collect_ids(name: &str, renderer: &Renderer, ids: &mut Vec<String>) {
    match renderer {
        Renderer::Display | Renderer::Text => ids.push(name.to_string()),
        Renderer::List(len) => ids.extend((0..*len).map(|i| format!("{name}-{i}"))),
        Renderer::Group(subs) => {
            for (sub, sub_renderer) in subs {
                if !matches!(sub_renderer, Renderer::Group(_)) {
                    collect_ids(&format!("{name}-{sub}"), sub_renderer, ids);
                }
            }
        }
    }
}

fn check_level(
    prefix: &str,
    declared: &[(String, Renderer)],
    fields: &Map<String, Value>,
) -> Vec<SchemaMismatch> {
    let qualify = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}-{name}")
        }
    };
    let mut out = Vec::new();
    for (name, renderer) in declared {
        match fields.get(name) {
            None => out.push(SchemaMismatch::Missing { field: qualify(name) }),
            Some(value) if !renderer.matches(value) => out.push(SchemaMismatch::Shape {
                field: qualify(name),
                expected: renderer.shape(),
                found: shape_of(value),
            }),
            Some(value) => {
                if let (Renderer::Group(subs), Some(map)) = (renderer, value.as_object()) {
                    if prefix.is_empty() {
                        out.extend(check_level(name, subs, map));
                    }
                }
            }
        }
    }
    for key in fields.keys() {
        if !declared.iter().any(|(name, _)| name == key) {
            out.push(SchemaMismatch::Undeclared { field: qualify(key) });
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    /// A page made of bare ids.
    #[derive(Debug, Default)]
    pub(crate) struct FakePage {
        pub elements: BTreeMap<String, Option<Content>>,
    }

    impl FakePage {
        pub fn with_ids(ids: &[&str]) -> Self {
            Self {
                elements: ids.iter().map(|id| (id.to_string(), None)).collect(),
            }
        }

        pub fn content(&self, id: &str) -> Option<&Content> {
            self.elements.get(id).and_then(Option::as_ref)
        }

        pub fn untouched(&self) -> bool {
            self.elements.values().all(Option::is_none)
        }
    }

    impl BindTarget for FakePage {
        fn contains(&self, id: &str) -> bool {
            self.elements.contains_key(id)
        }

        fn apply(&mut self, binding: &Binding) {
            self.elements
                .insert(binding.id.clone(), Some(binding.content.clone()));
        }
    }

    #[test]
    fn binds_display_value_and_colour() {
        let mut page = FakePage::with_ids(&["eps"]);
        let report = load_values(&json!({"eps": {"value": 10, "color": "#fff"}}), &mut page);
        assert_eq!(
            page.content("eps"),
            Some(&Content::Display {
                value: "10".into(),
                color: Some("#fff".into())
            })
        );
        assert_eq!(report.applied, ["eps"]);
        assert!(report.is_clean());
    }

    #[test]
    fn unknown_key_is_a_silent_skip() {
        let mut page = FakePage::with_ids(&["eps"]);
        let report = load_values(&json!({"sector": "Technology"}), &mut page);
        assert!(page.untouched());
        assert_eq!(report.skipped, ["sector"]);
        assert!(report.applied.is_empty());
    }

    #[test]
    fn lists_bind_by_index_and_skip_missing() {
        let mut page = FakePage::with_ids(&["roic-0", "roic-2"]);
        let data = json!({"roic": [
            {"value": 12.346, "color": "green"},
            {"value": 8, "color": "orange"},
            {"value": "null", "color": null}
        ]});
        let report = load_values(&data, &mut page);
        assert_eq!(report.applied, ["roic-0", "roic-2"]);
        assert_eq!(report.skipped, ["roic-1"]);
        assert_eq!(
            page.content("roic-2"),
            Some(&Content::Display {
                value: "-".into(),
                color: None
            })
        );
        assert_eq!(page.content("roic-0").unwrap().visible_text(), "12.35");
    }

    #[test]
    fn text_and_null_fields() {
        let mut page = FakePage::with_ids(&["name", "website"]);
        load_values(&json!({"name": "Apple Inc.", "website": null}), &mut page);
        assert_eq!(
            page.content("name"),
            Some(&Content::Text(Some("Apple Inc.".into())))
        );
        assert_eq!(page.content("website").unwrap().visible_text(), "-");
    }

    #[test]
    fn groups_fall_back_to_prefixed_ids() {
        let mut page = FakePage::with_ids(&["growth-sales", "growth-eps-1", "info-city"]);
        let data = json!({
            "growth": {
                "sales": {"value": 1500000, "color": "red"},
                "eps": [{"value": 1}, {"value": 2}],
                "deep": {"inner": {"value": 3}}
            },
            "info": {"city": "Cupertino", "zip": "95014"}
        });
        let report = load_values(&data, &mut page);
        assert_eq!(page.content("growth-sales").unwrap().visible_text(), "1 500 000");
        assert_eq!(page.content("growth-eps-1").unwrap().visible_text(), "2");
        assert_eq!(
            page.content("info-city"),
            Some(&Content::Text(Some("Cupertino".into())))
        );
        // Nesting past one level is never bound.
        assert!(report.skipped.contains(&"growth-deep".to_string()));
        assert!(report.skipped.contains(&"info-zip".to_string()));
    }

    #[test]
    fn existing_element_takes_group_object_whole() {
        let mut page = FakePage::with_ids(&["price", "price-value"]);
        load_values(&json!({"price": {"value": 3, "color": "blue"}}), &mut page);
        assert!(page.content("price").is_some());
        assert!(page.content("price-value").is_none());
    }

    #[test]
    fn missing_display_element_is_reported_by_key() {
        let mut page = FakePage::with_ids(&["eps-value", "eps-color"]);
        let report = load_values(&json!({"eps": {"value": 10, "color": "#fff"}}), &mut page);
        assert!(page.untouched());
        assert_eq!(report.skipped, ["eps"]);
        assert!(report.applied.is_empty());
    }

    #[test]
    fn non_object_response_binds_nothing() {
        let mut page = FakePage::with_ids(&["eps"]);
        let report = load_values(&json!(["eps"]), &mut page);
        assert_eq!(report, BindReport::default());
        assert!(page.untouched());
    }

    #[test]
    fn schema_detects_mismatches() {
        let schema = Schema::new()
            .field("eps", Renderer::List(2))
            .field("name", Renderer::Text)
            .field(
                "growth",
                Renderer::Group(vec![("sales".into(), Renderer::Display)]),
            );
        assert_eq!(
            schema.target_ids(),
            ["eps-0", "eps-1", "name", "growth-sales"]
        );

        let page = FakePage::with_ids(&["eps-0", "name"]);
        assert_eq!(schema.missing_targets(&page), ["eps-1", "growth-sales"]);

        let data = json!({
            "eps": {"value": 1},
            "growth": {"sales": "n/a", "extra": 1},
            "ticker": "AAPL"
        });
        let issues = schema.check(&data);
        assert!(issues.contains(&SchemaMismatch::Shape {
            field: "eps".into(),
            expected: "list",
            found: "display"
        }));
        assert!(issues.contains(&SchemaMismatch::Missing {
            field: "name".into()
        }));
        assert!(issues.contains(&SchemaMismatch::Shape {
            field: "growth-sales".into(),
            expected: "display",
            found: "text"
        }));
        assert!(issues.contains(&SchemaMismatch::Undeclared {
            field: "growth-extra".into()
        }));
        assert!(issues.contains(&SchemaMismatch::Undeclared {
            field: "ticker".into()
        }));
    }

    #[test]
    fn schema_reads_from_json() {
        let schema = Schema::from_json(
            r#"[["eps", {"list": 2}], ["name", "text"], ["growth", {"group": [["sales", "display"]]}]]"#,
        )
        .unwrap();
        assert_eq!(
            schema,
            Schema::new()
                .field("eps", Renderer::List(2))
                .field("name", Renderer::Text)
                .field(
                    "growth",
                    Renderer::Group(vec![("sales".into(), Renderer::Display)]),
                )
        );
        assert!(matches!(
            Schema::from_json(r#"[["eps", "chart"]]"#),
            Err(crate::Error::Json(_))
        ));

        let issues = schema.check(&json!({"eps": [1, 2], "name": "Apple"}));
        assert_eq!(
            serde_json::to_value(&issues).unwrap(),
            json!([{"kind": "missing", "field": "growth"}])
        );
    }
}
