use crate::sql;

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

///
/// FindOptions
///
/// Sort/limit/offset for read operations. Order fields may be
/// table-qualified in join context.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    pub order: Vec<(String, OrderDirection)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl FindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order.push((field.into(), direction));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render the trailing ORDER BY / LIMIT / OFFSET clauses, including the
    /// leading space. OFFSET without LIMIT gets the engine's unbounded
    /// limit sentinel.
    #[must_use]
    pub(crate) fn suffix(&self) -> String {
        let mut out = String::new();

        if !self.order.is_empty() {
            let fields = self
                .order
                .iter()
                .map(|(field, direction)| {
                    format!("{} {}", sql::column_ref(field), direction.keyword())
                })
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(" ORDER BY {fields}"));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                out.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => out.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => out.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        out
    }
}

///
/// Projection
///
/// Either every declared column, an ordered field list, or a source →
/// output-alias map.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Projection {
    #[default]
    All,
    Fields(Vec<String>),
    Aliased(Vec<(String, String)>),
}

impl Projection {
    #[must_use]
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(fields.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn aliased<I, S, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, A)>,
        S: Into<String>,
        A: Into<String>,
    {
        Self::Aliased(
            pairs
                .into_iter()
                .map(|(source, alias)| (source.into(), alias.into()))
                .collect(),
        )
    }
}
