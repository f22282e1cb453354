use crate::{
    codec::{self, SET_SEPARATOR, TS_EPOCH_FIELD},
    engine::Params,
    filter::{CmpFilter, CmpOp, Filter, FilterError, Operand},
    schema::{ColumnMap, ColumnType},
    sql::{self, ParamPool},
    value::Value,
};

///
/// Condition compiler
///
/// Recursive translation of a `Filter` into one SQL predicate fragment plus
/// its bound parameters. Total over well-formed filters; structurally
/// invalid operator/operand pairings fail with `FilterError`.
///
/// Values are always bound as named parameters. Only identifiers (routed
/// through `sql::quote_ident`) and fixed keywords reach the statement text.
///

/// Identity predicate for an empty filter or empty `And`.
const ALWAYS_TRUE: &str = "1=1";

/// Identity predicate for an empty `Or`.
const ALWAYS_FALSE: &str = "0=1";

///
/// CompiledPredicate
///
/// Freshly allocated per compile call; parameter names are unique within
/// one statement by construction.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CompiledPredicate {
    pub statement: String,
    pub params: Params,
}

/// Compile `filter` against the column map of the queried table(s).
///
/// The map drives text-set detection and timestamp column rewriting; fields
/// with no declared column compile as plain identifier references.
pub fn compile(filter: &Filter, columns: &ColumnMap) -> Result<CompiledPredicate, FilterError> {
    let mut pool = ParamPool::new();
    let mut params = Params::new();
    let statement = compile_node(filter, columns, &mut pool, &mut params)?;

    Ok(CompiledPredicate { statement, params })
}

fn compile_node(
    filter: &Filter,
    columns: &ColumnMap,
    pool: &mut ParamPool,
    params: &mut Params,
) -> Result<String, FilterError> {
    match filter {
        Filter::True => Ok(ALWAYS_TRUE.to_string()),
        Filter::And(children) => combine(children, "AND", ALWAYS_TRUE, columns, pool, params),
        Filter::Or(children) => combine(children, "OR", ALWAYS_FALSE, columns, pool, params),
        Filter::Raw {
            statement,
            params: raw,
        } => {
            params.merge(raw.clone());
            Ok(statement.clone())
        }
        Filter::Exists { field, present } => {
            let target = FieldTarget::resolve(field, columns, false);
            Ok(format!(
                "{} IS {}NULL",
                target.expr,
                if *present { "NOT " } else { "" }
            ))
        }
        Filter::Cmp(cmp) => compile_cmp(cmp, columns, pool, params),
    }
}

fn combine(
    children: &[Filter],
    joiner: &str,
    identity: &str,
    columns: &ColumnMap,
    pool: &mut ParamPool,
    params: &mut Params,
) -> Result<String, FilterError> {
    if children.is_empty() {
        return Ok(identity.to_string());
    }

    let compiled = children
        .iter()
        .map(|child| Ok(format!("({})", compile_node(child, columns, pool, params)?)))
        .collect::<Result<Vec<_>, FilterError>>()?;

    Ok(compiled.join(&format!(" {joiner} ")))
}

///
/// FieldTarget
///
/// A field reference resolved against the column map: the rendered
/// left-hand expression plus the declared logical type, if any.
///

struct FieldTarget {
    expr: String,
    ty: Option<ColumnType>,
}

impl FieldTarget {
    /// Resolution order: declared column (bare or table-qualified) wins;
    /// otherwise a dotted key extracts a JSON sub-path from its head
    /// column; otherwise the name passes through as a plain identifier.
    ///
    /// Timestamp columns store a structured document, so comparisons
    /// rewrite the reference to extract the epoch-millisecond field
    /// (`rewrite_timestamp`); presence checks look at the raw column.
    fn resolve(field: &str, columns: &ColumnMap, rewrite_timestamp: bool) -> Self {
        if let Some(ty) = columns.type_of(field) {
            let base = sql::column_ref(field);
            let expr = if rewrite_timestamp && ty == ColumnType::Timestamp {
                format!("json_extract({base}, '$.{TS_EPOCH_FIELD}')")
            } else {
                base
            };

            return Self { expr, ty: Some(ty) };
        }

        if let Some((head, path)) = field.split_once('.') {
            let escaped = path.replace('\'', "''");

            return Self {
                expr: format!("json_extract({}, '$.{escaped}')", sql::quote_ident(head)),
                ty: None,
            };
        }

        Self {
            expr: sql::column_ref(field),
            ty: None,
        }
    }
}

fn compile_cmp(
    cmp: &CmpFilter,
    columns: &ColumnMap,
    pool: &mut ParamPool,
    params: &mut Params,
) -> Result<String, FilterError> {
    let target = FieldTarget::resolve(&cmp.field, columns, true);
    let is_set = target.ty == Some(ColumnType::TextSet);

    match (&cmp.op, &cmp.operand) {
        (CmpOp::In | CmpOp::Nin, Operand::List(items)) => {
            compile_membership(&target, cmp.op == CmpOp::Nin, is_set, items, pool, params)
        }
        (CmpOp::Eq, Operand::Scalar(value)) if is_set && !value.is_null() => {
            // set membership is encoded, not stored as a scalar, so plain
            // equality becomes a delimiter-bounded substring match
            Ok(set_member_match(&target.expr, value, pool, params))
        }
        (op, Operand::Scalar(value)) => {
            let sql_op = match op {
                CmpOp::Eq => "=",
                CmpOp::Ne => "!=",
                CmpOp::Gt => ">",
                CmpOp::Gte => ">=",
                CmpOp::Lt => "<",
                CmpOp::Lte => "<=",
                CmpOp::Like => "LIKE",
                CmpOp::NLike => "NOT LIKE",
                CmpOp::Substr | CmpOp::NSubstr => {
                    let name = pool.bind(params, codec::encode_raw(value));
                    let negate = if *op == CmpOp::NSubstr { "NOT " } else { "" };

                    return Ok(format!(
                        "{} {negate}LIKE '%' || :{name} || '%'",
                        target.expr
                    ));
                }
                CmpOp::In | CmpOp::Nin => {
                    return Err(FilterError::OperandShape {
                        field: cmp.field.clone(),
                        op: op.label().to_string(),
                    });
                }
            };
            let name = pool.bind(params, codec::encode_raw(value));

            Ok(format!("{} {sql_op} :{name}", target.expr))
        }
        (op, Operand::List(_)) => Err(FilterError::OperandShape {
            field: cmp.field.clone(),
            op: op.label().to_string(),
        }),
    }
}

/// Membership over a bound list, with the documented degenerations:
/// one element collapses to equality, zero elements collapses to the
/// legacy null-comparison branch (never matches — kept verbatim from the
/// source system rather than silently redefined).
fn compile_membership(
    target: &FieldTarget,
    negate: bool,
    is_set: bool,
    items: &[Value],
    pool: &mut ParamPool,
    params: &mut Params,
) -> Result<String, FilterError> {
    match items {
        [] => {
            let name = pool.bind(params, codec::encode_raw(&Value::Null));
            let sql_op = if negate { "!=" } else { "=" };

            Ok(format!("{} {sql_op} :{name}", target.expr))
        }
        [single] if is_set && !single.is_null() => {
            let matched = set_member_match(&target.expr, single, pool, params);

            Ok(if negate {
                format!("NOT ({matched})")
            } else {
                matched
            })
        }
        [single] => {
            let name = pool.bind(params, codec::encode_raw(single));
            let sql_op = if negate { "!=" } else { "=" };

            Ok(format!("{} {sql_op} :{name}", target.expr))
        }
        many if is_set => {
            let matches = many
                .iter()
                .map(|member| set_member_match(&target.expr, member, pool, params))
                .collect::<Vec<_>>()
                .join(" OR ");

            Ok(if negate {
                format!("NOT ({matches})")
            } else {
                format!("({matches})")
            })
        }
        many => {
            let names = many
                .iter()
                .map(|item| format!(":{}", pool.bind(params, codec::encode_raw(item))))
                .collect::<Vec<_>>()
                .join(", ");
            let sql_op = if negate { "NOT IN" } else { "IN" };

            Ok(format!("{} {sql_op} ({names})", target.expr))
        }
    }
}

// `LIKE '%␟x␟%'` with the member bound; the separators are fixed encoding
// constants, not values.
fn set_member_match(
    expr: &str,
    member: &Value,
    pool: &mut ParamPool,
    params: &mut Params,
) -> String {
    let name = pool.bind(params, codec::encode_raw(member));

    format!("{expr} LIKE '%{SET_SEPARATOR}' || :{name} || '{SET_SEPARATOR}%'")
}
