//! Statement formatter.
//!
//! Lowers an AST into a flat [`SQL`] chunk list and renders it in one pass.
//! Everything dialect-specific is delegated to the formatter's
//! [`SqlDialect`].

use std::sync::Arc;

use crate::ast::{
    Argument, BinaryOp, Delete, Direction, Expr, Insert, Join, JoinKind, NullsOrder, OrderTerm, Projection,
    Select, Source, Statement, UnaryOp, Update,
};
use crate::config::FormatConfig;
use crate::dialect::SqlDialect;
use crate::error::{QuarryError, Result};
use crate::schema::Table;
use crate::sql::{Layout, SQL, Token};
use crate::types::SqlTypeExt;

/// Rendered statement text plus its arguments in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub arguments: Vec<Argument>,
}

impl Compiled {
    /// Number of placeholders (and arguments).
    #[inline]
    pub fn param_count(&self) -> usize {
        self.arguments.len()
    }
}

/// Formats statements for one dialect and layout.
#[derive(Debug, Clone)]
pub struct Formatter {
    dialect: Arc<dyn SqlDialect>,
    layout: Layout,
}

impl Formatter {
    pub fn new(dialect: impl SqlDialect + 'static) -> Self {
        Self::with_dialect(Arc::new(dialect))
    }

    pub fn with_dialect(dialect: Arc<dyn SqlDialect>) -> Self {
        Self {
            dialect,
            layout: Layout {
                beautify: false,
                indent: FormatConfig::DEFAULT_INDENT,
            },
        }
    }

    pub fn from_config(config: &FormatConfig) -> Self {
        Self::new(config.dialect).beautify(config.beautify).indent(config.indent)
    }

    pub fn beautify(mut self, beautify: bool) -> Self {
        self.layout.beautify = beautify;
        self
    }

    pub fn indent(mut self, width: usize) -> Self {
        self.layout.indent = width;
        self
    }

    #[inline]
    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Renders a statement to SQL text and its encoded arguments.
    pub fn format(&self, statement: &Statement) -> Result<Compiled> {
        let fragment = self.to_sql(statement)?;
        let (sql, arguments) = fragment.build(self.dialect(), self.layout);
        let arguments = arguments
            .into_iter()
            .map(|argument| {
                let value = argument.ty.encode(&argument.value)?;
                Ok(Argument {
                    value,
                    ty: argument.ty,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        crate::quarry_trace_query!(&sql, arguments.len());
        Ok(Compiled { sql, arguments })
    }

    /// Shorthand for formatting a query.
    pub fn format_select(&self, select: &Select) -> Result<Compiled> {
        self.format(&Statement::Select(select.clone()))
    }

    /// Lowers a statement to an unrendered fragment.
    pub fn to_sql(&self, statement: &Statement) -> Result<SQL> {
        match statement {
            Statement::Select(select) => self.select(select),
            Statement::Insert(insert) => self.insert(insert),
            Statement::Update(update) => self.update(update),
            Statement::Delete(delete) => self.delete(delete),
        }
    }

    // ==================== statements ====================

    fn select(&self, select: &Select) -> Result<SQL> {
        let mut sql = SQL::token(Token::SELECT);
        if select.distinct {
            sql.push_mut(Token::DISTINCT);
        }

        if select.projections.is_empty() {
            sql.push_mut(Token::STAR);
        } else {
            let items = select
                .projections
                .iter()
                .map(|projection| self.projection(projection))
                .collect::<Result<Vec<_>>>()?;
            sql.append_mut(SQL::join(items, Token::COMMA));
        }

        if let Some(source) = &select.from {
            sql.append_mut(SQL::clause().push(Token::FROM).append(self.source(source)?));
        }

        for join in &select.joins {
            sql.append_mut(SQL::clause().append(self.join(join)?));
        }

        if let Some(filter) = &select.filter {
            sql.append_mut(SQL::clause().push(Token::WHERE).append(self.expr(filter)?));
        }

        if !select.group_by.is_empty() {
            let items = self.expr_list(&select.group_by)?;
            sql.append_mut(
                SQL::clause()
                    .push(Token::GROUP)
                    .push(Token::BY)
                    .append(SQL::join(items, Token::COMMA)),
            );
        }

        if let Some(having) = &select.having {
            sql.append_mut(SQL::clause().push(Token::HAVING).append(self.expr(having)?));
        }

        if !select.order_by.is_empty() {
            let items = select
                .order_by
                .iter()
                .map(|term| self.order_term(term))
                .collect::<Result<Vec<_>>>()?;
            sql.append_mut(
                SQL::clause()
                    .push(Token::ORDER)
                    .push(Token::BY)
                    .append(SQL::join(items, Token::COMMA)),
            );
        }

        if let Some(pagination) = &select.pagination {
            if self.dialect.requires_order_for_pagination() && select.order_by.is_empty() {
                return Err(QuarryError::unsupported(format!(
                    "{} pagination requires an ORDER BY clause",
                    self.dialect.name()
                )));
            }
            let (offset, limit) = pagination.resolve();
            let fragment = self.dialect.paginate(offset, limit)?;
            if fragment.param_count() != 2 {
                return Err(QuarryError::unsupported(format!(
                    "{} pagination rendered {} parameters, expected 2",
                    self.dialect.name(),
                    fragment.param_count()
                )));
            }
            sql.append_mut(SQL::clause().append(fragment));
        }

        Ok(sql)
    }

    fn insert(&self, insert: &Insert) -> Result<SQL> {
        if insert.columns.is_empty() {
            return Err(QuarryError::unsupported(format!(
                "INSERT INTO {} names no columns",
                insert.table.name()
            )));
        }
        if insert.rows.is_empty() {
            return Err(QuarryError::unsupported(format!(
                "INSERT INTO {} has no rows",
                insert.table.name()
            )));
        }

        let columns = insert
            .columns
            .iter()
            .map(|column| SQL::ident(column.name()));
        let mut rows = Vec::with_capacity(insert.rows.len());
        for (index, row) in insert.rows.iter().enumerate() {
            if row.len() != insert.columns.len() {
                return Err(QuarryError::unsupported(format!(
                    "INSERT row {index} has {} values for {} columns",
                    row.len(),
                    insert.columns.len()
                )));
            }
            rows.push(SQL::join(self.expr_list(row)?, Token::COMMA).parens());
        }

        Ok(SQL::token(Token::INSERT)
            .push(Token::INTO)
            .append(SQL::ident(insert.table.name()))
            .append(SQL::join(columns, Token::COMMA).parens())
            .append(SQL::clause())
            .push(Token::VALUES)
            .append(SQL::join(rows, Token::COMMA)))
    }

    fn update(&self, update: &Update) -> Result<SQL> {
        if update.assignments.is_empty() {
            return Err(QuarryError::unsupported(format!(
                "UPDATE {} has no assignments",
                update.table.name()
            )));
        }

        let assignments = update
            .assignments
            .iter()
            .map(|(column, value)| {
                Ok(SQL::ident(column.name())
                    .push(Token::EQ)
                    .append(self.expr(value)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sql = SQL::token(Token::UPDATE)
            .append(table_reference(&update.table))
            .append(SQL::clause())
            .push(Token::SET)
            .append(SQL::join(assignments, Token::COMMA));
        if let Some(filter) = &update.filter {
            sql.append_mut(SQL::clause().push(Token::WHERE).append(self.expr(filter)?));
        }
        Ok(sql)
    }

    fn delete(&self, delete: &Delete) -> Result<SQL> {
        let mut sql = SQL::token(Token::DELETE)
            .push(Token::FROM)
            .append(table_reference(&delete.table));
        if let Some(filter) = &delete.filter {
            sql.append_mut(SQL::clause().push(Token::WHERE).append(self.expr(filter)?));
        }
        Ok(sql)
    }

    // ==================== clauses ====================

    fn projection(&self, projection: &Projection) -> Result<SQL> {
        let sql = self.expr(&projection.expr)?;
        Ok(match &projection.label {
            Some(label) => sql.alias(label.clone()),
            None => sql,
        })
    }

    fn source(&self, source: &Source) -> Result<SQL> {
        match source {
            Source::Table(table) => Ok(table_reference(table)),
            Source::Subquery { query, alias } => {
                Ok(self.select(query)?.parens().alias(alias.clone()))
            }
        }
    }

    fn join(&self, join: &Join) -> Result<SQL> {
        if !self.dialect.supports_join(join.kind) {
            return Err(QuarryError::unsupported(format!(
                "{} does not support {}",
                self.dialect.name(),
                join.kind.as_str()
            )));
        }

        let head = match join.kind {
            JoinKind::Inner => SQL::token(Token::INNER),
            JoinKind::Left => SQL::token(Token::LEFT),
            JoinKind::Right => SQL::token(Token::RIGHT),
            JoinKind::Full => SQL::token(Token::FULL),
            JoinKind::Cross => SQL::token(Token::CROSS),
        };
        let sql = head.push(Token::JOIN).append(self.source(&join.source)?);

        match (join.kind, &join.on) {
            (JoinKind::Cross, None) => Ok(sql),
            (JoinKind::Cross, Some(_)) => Err(QuarryError::unsupported(
                "CROSS JOIN does not take an ON condition",
            )),
            (_, Some(on)) => Ok(sql.push(Token::ON).append(self.expr(on)?)),
            (kind, None) => Err(QuarryError::unsupported(format!(
                "{} requires an ON condition",
                kind.as_str()
            ))),
        }
    }

    fn order_term(&self, term: &OrderTerm) -> Result<SQL> {
        let mut sql = self.expr(&term.expr)?.push(match term.direction {
            Direction::Asc => Token::ASC,
            Direction::Desc => Token::DESC,
        });
        if let Some(nulls) = term.nulls {
            sql.push_mut(Token::NULLS);
            sql.push_mut(match nulls {
                NullsOrder::First => Token::FIRST,
                NullsOrder::Last => Token::LAST,
            });
        }
        Ok(sql)
    }

    // ==================== expressions ====================

    fn expr_list(&self, exprs: &[Expr]) -> Result<Vec<SQL>> {
        exprs.iter().map(|expr| self.expr(expr)).collect()
    }

    fn expr(&self, expr: &Expr) -> Result<SQL> {
        match expr {
            Expr::Column(column) => Ok(SQL::qualified(column.table_reference(), column.name())),
            Expr::Argument(argument) => Ok(SQL::param(argument.clone())),
            Expr::Raw(text) => Ok(SQL::raw(text.clone())),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.operand(lhs, *op, false)?;
                let rhs = self.operand(rhs, *op, true)?;
                Ok(lhs.push(binary_token(*op)).append(rhs))
            }
            Expr::Unary { op, expr: inner } => {
                let operand = self.expr(inner)?;
                let operand = if matches!(**inner, Expr::Binary { .. }) {
                    operand.parens()
                } else {
                    operand
                };
                Ok(match op {
                    UnaryOp::Not => SQL::token(Token::NOT).append(operand),
                    UnaryOp::Neg => SQL::token(Token::MINUS).append(operand),
                })
            }
            Expr::Function { name, args } => Ok(SQL::func(
                name.clone(),
                SQL::join(self.expr_list(args)?, Token::COMMA),
            )),
            Expr::IsNull { expr: inner, negated } => {
                let mut sql = self.predicate_operand(inner)?.push(Token::IS);
                if *negated {
                    sql.push_mut(Token::NOT);
                }
                Ok(sql.push(Token::NULL))
            }
            Expr::InList {
                expr: inner,
                list,
                negated,
            } => {
                if list.is_empty() {
                    return Err(QuarryError::unsupported("IN with an empty list"));
                }
                let mut sql = self.predicate_operand(inner)?;
                if *negated {
                    sql.push_mut(Token::NOT);
                }
                Ok(sql
                    .push(Token::IN)
                    .append(SQL::join(self.expr_list(list)?, Token::COMMA).parens()))
            }
            Expr::Between {
                expr: inner,
                low,
                high,
                negated,
            } => {
                let mut sql = self.predicate_operand(inner)?;
                if *negated {
                    sql.push_mut(Token::NOT);
                }
                Ok(sql
                    .push(Token::BETWEEN)
                    .append(self.predicate_operand(low)?)
                    .push(Token::AND)
                    .append(self.predicate_operand(high)?))
            }
            Expr::Like {
                expr: inner,
                pattern,
                negated,
            } => {
                let mut sql = self.predicate_operand(inner)?;
                if *negated {
                    sql.push_mut(Token::NOT);
                }
                Ok(sql.push(Token::LIKE).append(self.predicate_operand(pattern)?))
            }
            Expr::Subquery(query) => Ok(self.select(query)?.parens()),
            Expr::Exists { query, negated } => {
                let sql = if *negated {
                    SQL::token(Token::NOT).push(Token::EXISTS)
                } else {
                    SQL::token(Token::EXISTS)
                };
                Ok(sql.append(self.select(query)?.parens()))
            }
        }
    }

    /// Renders a binary operand, parenthesized when its own operator binds
    /// looser than the parent's (or equally, on the right of a
    /// non-associative operator).
    fn operand(&self, operand: &Expr, parent: BinaryOp, right: bool) -> Result<SQL> {
        let sql = self.expr(operand)?;
        let needs_parens = match operand {
            Expr::Binary { op, .. } => {
                let (child, outer) = (precedence(*op), precedence(parent));
                child < outer || (right && child == outer && !is_associative(parent))
            }
            Expr::IsNull { .. }
            | Expr::InList { .. }
            | Expr::Between { .. }
            | Expr::Like { .. } => precedence(parent) > precedence(BinaryOp::Eq),
            _ => false,
        };
        Ok(if needs_parens { sql.parens() } else { sql })
    }

    /// Operands of IS/IN/BETWEEN/LIKE: any binary operator is parenthesized.
    fn predicate_operand(&self, operand: &Expr) -> Result<SQL> {
        let sql = self.expr(operand)?;
        Ok(match operand {
            Expr::Binary { .. } => sql.parens(),
            _ => sql,
        })
    }
}

fn table_reference(table: &Table) -> SQL {
    let sql = SQL::ident(table.name());
    match table.alias() {
        Some(alias) => sql.alias(alias),
        None => sql,
    }
}

const fn binary_token(op: BinaryOp) -> Token {
    match op {
        BinaryOp::Eq => Token::EQ,
        BinaryOp::Ne => Token::NE,
        BinaryOp::Lt => Token::LT,
        BinaryOp::Le => Token::LE,
        BinaryOp::Gt => Token::GT,
        BinaryOp::Ge => Token::GE,
        BinaryOp::And => Token::AND,
        BinaryOp::Or => Token::OR,
        BinaryOp::Add => Token::PLUS,
        BinaryOp::Sub => Token::MINUS,
        BinaryOp::Mul => Token::STAR,
        BinaryOp::Div => Token::SLASH,
        BinaryOp::Concat => Token::CONCAT,
    }
}

const fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
        BinaryOp::Add | BinaryOp::Sub => 4,
        BinaryOp::Mul | BinaryOp::Div => 5,
        BinaryOp::Concat => 6,
    }
}

const fn is_associative(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::And | BinaryOp::Or | BinaryOp::Add | BinaryOp::Mul | BinaryOp::Concat
    )
}
