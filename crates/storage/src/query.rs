use serde::{Deserialize, Serialize};

/// A clause recorded on a [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryField {
    Delimiter,
    Prefix,
    Versions,
    StartOffset,
    EndOffset,
    Projection,
}

/// Which object attributes a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Full,
    NoAcl,
}

/// Filter for [`FileStorage::list`](crate::FileStorage::list).
///
/// Built with the `with_*` functions, which record the clause in `fields`
/// in the order they were applied. Backends only honour recorded clauses.
///
/// ```
/// use panicguard_storage::query::{Query, QueryField, with_delimiter, with_prefix};
///
/// let q = with_prefix(with_delimiter(Query::default(), "/"), "photos");
/// assert_eq!(q.fields, vec![QueryField::Delimiter, QueryField::Prefix]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub fields: Vec<QueryField>,
    pub delimiter: String,
    pub prefix: String,
    pub versions: bool,
    pub start_offset: String,
    pub end_offset: String,
    pub projection: Projection,
}

impl Query {
    pub fn has(&self, field: QueryField) -> bool {
        self.fields.contains(&field)
    }
}

pub fn with_delimiter(mut query: Query, delimiter: impl Into<String>) -> Query {
    query.fields.push(QueryField::Delimiter);
    query.delimiter = delimiter.into();
    query
}

pub fn with_prefix(mut query: Query, prefix: impl Into<String>) -> Query {
    query.fields.push(QueryField::Prefix);
    query.prefix = prefix.into();
    query
}

pub fn with_versions(mut query: Query, versions: bool) -> Query {
    query.fields.push(QueryField::Versions);
    query.versions = versions;
    query
}

pub fn with_start_offset(mut query: Query, start_offset: impl Into<String>) -> Query {
    query.fields.push(QueryField::StartOffset);
    query.start_offset = start_offset.into();
    query
}

pub fn with_end_offset(mut query: Query, end_offset: impl Into<String>) -> Query {
    query.fields.push(QueryField::EndOffset);
    query.end_offset = end_offset.into();
    query
}

pub fn with_projection(mut query: Query, projection: Projection) -> Query {
    query.fields.push(QueryField::Projection);
    query.projection = projection;
    query
}
