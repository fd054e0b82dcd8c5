//! Document selector queries
//!
//! A query is a JSON object in the CouchDB style:
//!
//! ```json
//! {"selector": {"docType": "entryLog", "facilityID": "Facility1"},
//!  "fields": ["entryLogID"], "sort": [{"entryTime": "desc"}], "limit": 10}
//! ```
//!
//! ## Selector Syntax
//!
//! | Form | Meaning |
//! |------|---------|
//! | `{"f": v}` | field equals `v` |
//! | `{"a": {"b": v}}` | nested field `a.b` equals `v` |
//! | `{"a.b": v}` | dotted path, same as above |
//! | `{"f": {"$gt": v, "$lt": w}}` | every operator must hold |
//! | `$eq $ne $gt $gte $lt $lte` | comparison under JSON collation |
//! | `$in $nin` | membership in an array of values |
//! | `$exists` | field presence |
//! | `$and $or $nor` | combinators over an array of selectors |
//! | `$not` | negation of a selector or a field condition |
//!
//! Collation order across types is `null < false < true < numbers < strings
//! < arrays < objects`. Except for `$exists: false` and `$not`, a condition
//! on a missing field never matches. `use_index` and `bookmark` are accepted
//! and ignored.

use std::cmp::Ordering;

use entrylog_core::{Error, Result};
use serde_json::{Map, Value};

/// A parsed selector query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    selector: Selector,
    fields: Option<Vec<Vec<String>>>,
    sort: Vec<SortField>,
    limit: Option<usize>,
    skip: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    And(Vec<Selector>),
    Or(Vec<Selector>),
    Nor(Vec<Selector>),
    Not(Box<Selector>),
    Field { path: Vec<String>, cond: Condition },
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    Not(Box<Condition>),
    All(Vec<Condition>),
}

#[derive(Debug, Clone, PartialEq)]
struct SortField {
    path: Vec<String>,
    descending: bool,
}

impl Query {
    /// Parse query text
    ///
    /// Fails with `MalformedInput` if the text is not a JSON object with a
    /// `selector` object, or uses an unknown operator.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::malformed(format!("query is not valid JSON: {}", e)))?;
        let Value::Object(mut root) = value else {
            return Err(Error::malformed("query must be a JSON object"));
        };

        let selector = match root.remove("selector") {
            Some(Value::Object(map)) => parse_selector(&map, &[])?,
            Some(_) => return Err(Error::malformed("selector must be a JSON object")),
            None => return Err(Error::malformed("query has no selector")),
        };

        let mut query = Query {
            selector,
            fields: None,
            sort: Vec::new(),
            limit: None,
            skip: 0,
        };

        for (key, value) in root {
            match key.as_str() {
                "fields" => query.fields = Some(parse_fields(&value)?),
                "sort" => query.sort = parse_sort(&value)?,
                "limit" => query.limit = Some(parse_count("limit", &value)?),
                "skip" => query.skip = parse_count("skip", &value)?,
                "use_index" | "bookmark" => {}
                other => {
                    return Err(Error::malformed(format!("unknown query field: {}", other)))
                }
            }
        }

        Ok(query)
    }

    /// Whether a document satisfies the selector
    pub fn matches(&self, doc: &Value) -> bool {
        doc.is_object() && self.selector.matches(doc)
    }

    /// Filter, sort, page and project `(key, document)` pairs
    ///
    /// Input order is preserved among documents that compare equal under
    /// the sort fields.
    pub fn evaluate<I>(&self, docs: I) -> Vec<(String, Value)>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut hits: Vec<(String, Value)> =
            docs.into_iter().filter(|(_, doc)| self.matches(doc)).collect();

        if !self.sort.is_empty() {
            hits.sort_by(|(_, a), (_, b)| self.compare_for_sort(a, b));
        }

        let limit = self.limit.unwrap_or(usize::MAX);
        hits.into_iter()
            .skip(self.skip)
            .take(limit)
            .map(|(key, doc)| {
                let doc = self.project(&doc);
                (key, doc)
            })
            .collect()
    }

    /// Whether results are reshaped by a `fields` projection
    pub fn has_projection(&self) -> bool {
        self.fields.is_some()
    }

    fn project(&self, doc: &Value) -> Value {
        let Some(fields) = &self.fields else {
            return doc.clone();
        };
        let mut out = Map::new();
        for path in fields {
            if let Some(v) = resolve(doc, path) {
                insert_path(&mut out, path, v.clone());
            }
        }
        Value::Object(out)
    }

    fn compare_for_sort(&self, a: &Value, b: &Value) -> Ordering {
        for field in &self.sort {
            let ord = match (resolve(a, &field.path), resolve(b, &field.path)) {
                (Some(x), Some(y)) => collate(x, y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = if field.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl Selector {
    fn matches(&self, doc: &Value) -> bool {
        match self {
            Selector::And(all) => all.iter().all(|s| s.matches(doc)),
            Selector::Or(any) => any.iter().any(|s| s.matches(doc)),
            Selector::Nor(none) => !none.iter().any(|s| s.matches(doc)),
            Selector::Not(inner) => !inner.matches(doc),
            Selector::Field { path, cond } => cond.holds(resolve(doc, path)),
        }
    }
}

impl Condition {
    fn holds(&self, field: Option<&Value>) -> bool {
        match self {
            Condition::Exists(expected) => field.is_some() == *expected,
            Condition::Not(inner) => !inner.holds(field),
            Condition::All(all) => all.iter().all(|c| c.holds(field)),
            _ => match field {
                Some(v) => self.holds_on(v),
                None => false,
            },
        }
    }

    fn holds_on(&self, v: &Value) -> bool {
        match self {
            Condition::Eq(x) => collate(v, x) == Ordering::Equal,
            Condition::Ne(x) => collate(v, x) != Ordering::Equal,
            Condition::Gt(x) => same_class(v, x) && collate(v, x) == Ordering::Greater,
            Condition::Gte(x) => same_class(v, x) && collate(v, x) != Ordering::Less,
            Condition::Lt(x) => same_class(v, x) && collate(v, x) == Ordering::Less,
            Condition::Lte(x) => same_class(v, x) && collate(v, x) != Ordering::Greater,
            Condition::In(xs) => xs.iter().any(|x| collate(v, x) == Ordering::Equal),
            Condition::Nin(xs) => !xs.iter().any(|x| collate(v, x) == Ordering::Equal),
            Condition::Exists(_) | Condition::Not(_) | Condition::All(_) => self.holds(Some(v)),
        }
    }
}

fn parse_selector(map: &Map<String, Value>, prefix: &[String]) -> Result<Selector> {
    let mut clauses = Vec::with_capacity(map.len());

    for (key, value) in map {
        if let Some(op) = key.strip_prefix('$') {
            if !prefix.is_empty() {
                // {"a": {"$gt": 1}} is a field condition, parsed in parse_condition
                return Err(Error::malformed(format!(
                    "operator ${} mixed with nested fields",
                    op
                )));
            }
            clauses.push(parse_combinator(op, value)?);
        } else {
            let mut path = prefix.to_vec();
            path.extend(split_path(key)?);
            clauses.push(parse_field(path, value)?);
        }
    }

    Ok(match clauses.len() {
        1 => clauses.remove(0),
        _ => Selector::And(clauses),
    })
}

fn parse_combinator(op: &str, value: &Value) -> Result<Selector> {
    match op {
        "and" | "or" | "nor" => {
            let Value::Array(items) = value else {
                return Err(Error::malformed(format!("${} expects an array", op)));
            };
            let parts = items
                .iter()
                .map(|item| match item {
                    Value::Object(m) => parse_selector(m, &[]),
                    _ => Err(Error::malformed(format!(
                        "${} members must be selector objects",
                        op
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(match op {
                "and" => Selector::And(parts),
                "or" => Selector::Or(parts),
                _ => Selector::Nor(parts),
            })
        }
        "not" => match value {
            Value::Object(m) => Ok(Selector::Not(Box::new(parse_selector(m, &[])?))),
            _ => Err(Error::malformed("$not expects a selector object")),
        },
        other => Err(Error::malformed(format!("unknown operator: ${}", other))),
    }
}

fn parse_field(path: Vec<String>, value: &Value) -> Result<Selector> {
    match value {
        Value::Object(m) if !m.is_empty() && m.keys().all(|k| k.starts_with('$')) => {
            Ok(Selector::Field {
                path,
                cond: parse_condition(m)?,
            })
        }
        Value::Object(m) if !m.is_empty() && m.keys().any(|k| k.starts_with('$')) => Err(
            Error::malformed(format!("field {} mixes operators and subfields", path.join("."))),
        ),
        Value::Object(m) if !m.is_empty() => parse_selector(m, &path),
        other => Ok(Selector::Field {
            path,
            cond: Condition::Eq(other.clone()),
        }),
    }
}

fn parse_condition(ops: &Map<String, Value>) -> Result<Condition> {
    let mut conds = Vec::with_capacity(ops.len());
    for (op, arg) in ops {
        let cond = match op.as_str() {
            "$eq" => Condition::Eq(arg.clone()),
            "$ne" => Condition::Ne(arg.clone()),
            "$gt" => Condition::Gt(arg.clone()),
            "$gte" => Condition::Gte(arg.clone()),
            "$lt" => Condition::Lt(arg.clone()),
            "$lte" => Condition::Lte(arg.clone()),
            "$in" | "$nin" => {
                let Value::Array(items) = arg else {
                    return Err(Error::malformed(format!("{} expects an array", op)));
                };
                if op == "$in" {
                    Condition::In(items.clone())
                } else {
                    Condition::Nin(items.clone())
                }
            }
            "$exists" => match arg {
                Value::Bool(b) => Condition::Exists(*b),
                _ => return Err(Error::malformed("$exists expects a boolean")),
            },
            "$not" => match arg {
                Value::Object(m) if m.keys().all(|k| k.starts_with('$')) => {
                    Condition::Not(Box::new(parse_condition(m)?))
                }
                other => Condition::Not(Box::new(Condition::Eq(other.clone()))),
            },
            other => return Err(Error::malformed(format!("unknown operator: {}", other))),
        };
        conds.push(cond);
    }
    Ok(match conds.len() {
        1 => conds.remove(0),
        _ => Condition::All(conds),
    })
}

fn parse_fields(value: &Value) -> Result<Vec<Vec<String>>> {
    let Value::Array(items) = value else {
        return Err(Error::malformed("fields must be an array of strings"));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => split_path(s),
            _ => Err(Error::malformed("fields must be an array of strings")),
        })
        .collect()
}

fn parse_sort(value: &Value) -> Result<Vec<SortField>> {
    let Value::Array(items) = value else {
        return Err(Error::malformed("sort must be an array"));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(SortField {
                path: split_path(s)?,
                descending: false,
            }),
            Value::Object(m) if m.len() == 1 => {
                let (field, dir) = m.iter().next().ok_or_else(|| Error::malformed("empty sort"))?;
                let descending = match dir.as_str() {
                    Some("asc") => false,
                    Some("desc") => true,
                    _ => {
                        return Err(Error::malformed(format!(
                            "sort direction for {} must be \"asc\" or \"desc\"",
                            field
                        )))
                    }
                };
                Ok(SortField {
                    path: split_path(field)?,
                    descending,
                })
            }
            _ => Err(Error::malformed("sort entries must be a field name or {field: dir}")),
        })
        .collect()
}

fn parse_count(name: &str, value: &Value) -> Result<usize> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| Error::malformed(format!("{} must be a non-negative integer", name)))
}

fn split_path(field: &str) -> Result<Vec<String>> {
    if field.is_empty() || field.split('.').any(str::is_empty) {
        return Err(Error::malformed(format!("invalid field path: {:?}", field)));
    }
    Ok(field.split('.').map(str::to_string).collect())
}

fn resolve<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, segment| node.as_object()?.get(segment))
}

fn insert_path(out: &mut Map<String, Value>, path: &[String], value: Value) {
    match path {
        [] => {}
        [last] => {
            out.insert(last.clone(), value);
        }
        [head, rest @ ..] => {
            let child = out
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(m) = child {
                insert_path(m, rest, value);
            }
        }
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

fn same_class(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(_), Value::Bool(_)) => true,
        _ => type_rank(a) == type_rank(b),
    }
}

/// Total order over JSON values used for comparisons and sorting
pub fn collate(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = collate(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| collate(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
