use crate::{
    codec,
    engine::Params,
    filter::{CmpFilter, CmpOp, Filter, FilterError, Operand},
    value::Value,
};
use serde_json::{Map, Value as Wire};

///
/// Wire decoding
///
/// The JSON wire shape is decoded into the closed `Filter` AST exactly once
/// here. Shape decisions (scalar vs list vs operator object vs combinator)
/// happen at this boundary only; everything downstream is a total match.
///
/// Dispatch order per field is fixed: list first, then operator object,
/// then scalar fallback.
///

impl Filter {
    /// Decode a JSON filter document.
    pub fn from_wire(wire: &Wire) -> Result<Self, FilterError> {
        let obj = wire.as_object().ok_or(FilterError::NotAnObject)?;

        if obj.contains_key("$statement") {
            return decode_raw(obj);
        }

        let mut clauses = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            clauses.push(decode_entry(key, val)?);
        }

        Ok(match clauses.len() {
            0 => Self::True,
            1 => clauses.remove(0),
            _ => Self::And(clauses),
        })
    }
}

fn decode_raw(obj: &Map<String, Wire>) -> Result<Filter, FilterError> {
    let statement = obj
        .get("$statement")
        .and_then(Wire::as_str)
        .ok_or(FilterError::RawShape)?;

    let mut params = Params::new();
    if let Some(raw_params) = obj.get("$params") {
        let entries = raw_params.as_object().ok_or(FilterError::RawShape)?;
        for (name, value) in entries {
            params.insert(name.clone(), codec::encode_raw(&Value::from_wire(value)));
        }
    }

    if obj.keys().any(|k| k != "$statement" && k != "$params") {
        return Err(FilterError::RawShape);
    }

    Ok(Filter::raw(statement, params))
}

fn decode_entry(key: &str, val: &Wire) -> Result<Filter, FilterError> {
    match key {
        "$and" | "$or" => {
            let children = val
                .as_array()
                .ok_or_else(|| FilterError::CombinatorShape {
                    key: key.to_string(),
                })?
                .iter()
                .map(Filter::from_wire)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(if key == "$and" {
                Filter::And(children)
            } else {
                Filter::Or(children)
            })
        }
        other if other.starts_with('$') => Err(FilterError::UnknownOperator {
            op: other.to_string(),
        }),
        field => decode_field(field, val),
    }
}

fn decode_field(field: &str, val: &Wire) -> Result<Filter, FilterError> {
    // list first, then operator object, then scalar
    if let Some(items) = val.as_array() {
        return Ok(Filter::Cmp(CmpFilter {
            field: field.to_string(),
            op: CmpOp::In,
            operand: Operand::List(decode_scalar_list(field, items)?),
        }));
    }

    if let Some(obj) = val.as_object() {
        return decode_operator_object(field, obj);
    }

    Ok(Filter::Cmp(CmpFilter {
        field: field.to_string(),
        op: CmpOp::Eq,
        operand: Operand::Scalar(Value::from_wire(val)),
    }))
}

fn decode_operator_object(field: &str, obj: &Map<String, Wire>) -> Result<Filter, FilterError> {
    let mut entries = obj.iter();
    let (Some((op_key, operand)), None) = (entries.next(), entries.next()) else {
        return Err(FilterError::OperatorShape {
            field: field.to_string(),
        });
    };

    if !op_key.starts_with('$') {
        return Err(FilterError::OperatorShape {
            field: field.to_string(),
        });
    }

    let op = match op_key.as_str() {
        "$eq" => CmpOp::Eq,
        "$ne" => CmpOp::Ne,
        "$gt" => CmpOp::Gt,
        "$gte" => CmpOp::Gte,
        "$lt" => CmpOp::Lt,
        "$lte" => CmpOp::Lte,
        "$like" => CmpOp::Like,
        "$nlike" => CmpOp::NLike,
        "$substr" => CmpOp::Substr,
        "$nsubstr" => CmpOp::NSubstr,
        "$in" | "$nin" => {
            let items = operand.as_array().ok_or_else(|| FilterError::OperandShape {
                field: field.to_string(),
                op: op_key.clone(),
            })?;

            return Ok(Filter::Cmp(CmpFilter {
                field: field.to_string(),
                op: if op_key == "$in" { CmpOp::In } else { CmpOp::Nin },
                operand: Operand::List(decode_scalar_list(field, items)?),
            }));
        }
        "$exists" => {
            let present = operand.as_bool().ok_or_else(|| FilterError::OperandShape {
                field: field.to_string(),
                op: op_key.clone(),
            })?;

            return Ok(Filter::Exists {
                field: field.to_string(),
                present,
            });
        }
        other => {
            return Err(FilterError::UnknownOperator {
                op: other.to_string(),
            });
        }
    };

    if operand.is_array() {
        return Err(FilterError::OperandShape {
            field: field.to_string(),
            op: op_key.clone(),
        });
    }

    Ok(Filter::Cmp(CmpFilter {
        field: field.to_string(),
        op,
        operand: Operand::Scalar(Value::from_wire(operand)),
    }))
}

fn decode_scalar_list(field: &str, items: &[Wire]) -> Result<Vec<Value>, FilterError> {
    items
        .iter()
        .map(|item| {
            if item.is_array() || item.is_object() {
                Err(FilterError::NonScalarElement {
                    field: field.to_string(),
                })
            } else {
                Ok(Value::from_wire(item))
            }
        })
        .collect()
}
