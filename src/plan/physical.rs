//! Lowers a logical plan tree onto a physical operator tree.
//!
//! The mapping is fixed: Scan → SeqScan, Filter → Filter, Project →
//! Projection, Limit → Limit. Schemas are resolved bottom-up while
//! building, so predicates compile to index-based closures and
//! projections to 1-indexed position sets before execution starts.

use crate::catalog::schema::{INT_TYPE_ID, TEXT_TYPE_ID};
use crate::exec::filter::{FilterOp, Predicate};
use crate::exec::limit::LimitOp;
use crate::exec::operator::Operator;
use crate::exec::projection::ProjectionOp;
use crate::exec::seq_scan::SeqScanOp;
use crate::model::table_manager::TableManager;
use crate::plan::{BinaryOp, Expr, LogicalPlan};
use crate::value::{Schema, Value};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no table named {0}")]
    UnknownTable(String),
    #[error("no column named {0}")]
    UnknownColumn(String),
    #[error("literal {literal:?} is not valid for column {col}")]
    BadLiteral { col: String, literal: String },
    #[error("unsupported predicate shape")]
    UnsupportedPredicate,
}

/// State threaded through planning. Holds whatever the planner needs to
/// resolve names; today that is just the table manager.
pub struct PlanningContext<'a> {
    pub table_manager: &'a mut TableManager,
}

impl<'a> PlanningContext<'a> {
    pub fn new(table_manager: &'a mut TableManager) -> Self {
        Self { table_manager }
    }
}

/// Builds the operator tree for `plan`.
pub fn build(
    plan: &LogicalPlan,
    ctx: &mut PlanningContext<'_>,
) -> Result<Box<dyn Operator>, PlanError> {
    build_node(plan, ctx).map(|(op, _)| op)
}

fn build_node(
    plan: &LogicalPlan,
    ctx: &mut PlanningContext<'_>,
) -> Result<(Box<dyn Operator>, Schema), PlanError> {
    match plan {
        LogicalPlan::Scan { table } => {
            let relation = ctx
                .table_manager
                .open_table(table)
                .map_err(|_| PlanError::UnknownTable(table.clone()))?;
            let schema = relation.borrow().schema();
            Ok((Box::new(SeqScanOp::new(relation)), schema))
        }

        LogicalPlan::Filter { child, predicate } => {
            let (child_op, schema) = build_node(child, ctx)?;
            let predicate = compile_predicate(predicate, &schema)?;
            Ok((Box::new(FilterOp::new(child_op, predicate)), schema))
        }

        LogicalPlan::Project { child, columns } => {
            let (child_op, schema) = build_node(child, ctx)?;

            let mut keep_positions = HashSet::new();
            for name in columns {
                let idx = schema
                    .iter()
                    .position(|col| &col.col_name == name)
                    .ok_or_else(|| PlanError::UnknownColumn(name.clone()))?;
                keep_positions.insert((idx + 1) as u16);
            }
            let out_schema: Schema = Arc::new(
                schema
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| keep_positions.contains(&((idx + 1) as u16)))
                    .map(|(_, col)| col.clone())
                    .collect(),
            );
            Ok((
                Box::new(ProjectionOp::new(child_op, keep_positions, out_schema.clone())),
                out_schema,
            ))
        }

        LogicalPlan::Limit { child, limit } => {
            let (child_op, schema) = build_node(child, ctx)?;
            Ok((Box::new(LimitOp::new(child_op, *limit)), schema))
        }
    }
}

/// Comparison target pre-parsed against the column's declared type.
enum CompiledLiteral {
    Int(u32),
    Text(String),
}

/// Compiles a `column <op> literal` comparison (either orientation) into
/// a pure closure over tuples of `schema`.
fn compile_predicate(expr: &Expr, schema: &Schema) -> Result<Predicate, PlanError> {
    let Expr::Binary { op, lhs, rhs } = expr else {
        return Err(PlanError::UnsupportedPredicate);
    };

    let (column, literal, op) = match (lhs.as_ref(), rhs.as_ref()) {
        (Expr::Column(col), Expr::Literal(lit)) => (col, lit, *op),
        (Expr::Literal(lit), Expr::Column(col)) => (col, lit, flip(*op)),
        _ => return Err(PlanError::UnsupportedPredicate),
    };

    let idx = schema
        .iter()
        .position(|col| &col.col_name == column)
        .ok_or_else(|| PlanError::UnknownColumn(column.clone()))?;

    let target = match schema[idx].type_id {
        INT_TYPE_ID => CompiledLiteral::Int(literal.parse().map_err(|_| PlanError::BadLiteral {
            col: column.clone(),
            literal: literal.clone(),
        })?),
        TEXT_TYPE_ID => CompiledLiteral::Text(literal.clone()),
        _ => {
            return Err(PlanError::BadLiteral {
                col: column.clone(),
                literal: literal.clone(),
            });
        }
    };

    Ok(Box::new(move |tuple| {
        let ordering = match (tuple.value(idx), &target) {
            (Value::Int(v), CompiledLiteral::Int(t)) => v.cmp(t),
            (Value::Text(v), CompiledLiteral::Text(t)) => v.as_str().cmp(t.as_str()),
            _ => return false,
        };
        match op {
            BinaryOp::Eq => ordering.is_eq(),
            BinaryOp::NotEq => ordering.is_ne(),
            BinaryOp::Lt => ordering.is_lt(),
            BinaryOp::LtEq => ordering.is_le(),
            BinaryOp::Gt => ordering.is_gt(),
            BinaryOp::GtEq => ordering.is_ge(),
        }
    }))
}

/// Mirror of a comparison when the column sits on the right-hand side.
fn flip(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Eq => BinaryOp::Eq,
        BinaryOp::NotEq => BinaryOp::NotEq,
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::LtEq => BinaryOp::GtEq,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::GtEq => BinaryOp::LtEq,
    }
}
