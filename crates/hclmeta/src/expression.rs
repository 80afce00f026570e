//! expression conversion
//!
//! Expressions are never evaluated. Literals and simple containers become [Value]s, everything else is
//! reconstructed from the source text into a readable string.
//!
//! There are two ways to look at an expression:
//! - **value context** ([ExpressionConverter::convert]): attribute values, array elements and object values
//! - **string context** ([ExpressionConverter::render]): template parts, object keys and function arguments.
//!   Literals are coerced to strings and containers are kept as raw source text.
//!
//! | expression                       | value context                         | string context        |
//! |----------------------------------|---------------------------------------|-----------------------|
//! | `null`, `true`, `42`, `"text"`   | JSON value                            | `null`, `true`, ...   |
//! | `[..]`, `{..}`                   | array / object                        | source text           |
//! | `"${a}-b"`, heredoc              | rendered parts, concatenated          | same                  |
//! | `var.a`, `a["b"]`                | source text, `"` replaced by `'`      | same                  |
//! | `a[*].b`, `a[var.i]`             | source text                           | `"` replaced by `'`   |
//! | `a + b`, `!a`                    | source text                           | `"` replaced by `'`   |
//! | `c ? a : b`                      | `( c ? a : b )`                       | same                  |
//! | `[for v in c : v]`               | `%{for v in c}v%{endfor}`             | same                  |
//! | `f(a, b)`                        | `f(a, b)`                             | same                  |
//! | `(a)`, templates with directives | `${(a)}`                              | same                  |
use crate::error::ConversionError;
use crate::range::RangeMapper;
use crate::value::Value;
use hcl_edit::expr::{
    Conditional, Expression, ForExpr, FuncCall, ObjectKey, Traversal, TraversalOperator,
};
use hcl_edit::template::Element;
use hcl_edit::Span;

/// Converts expressions of a single source text
#[derive(derive_new::new, Debug)]
pub struct ExpressionConverter<'a> {
    ranges: &'a RangeMapper<'a>,
}

impl<'a> ExpressionConverter<'a> {
    /// Convert an expression in value context
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn convert(&self, expr: &Expression) -> Result<Value, ConversionError> {
        let value = match expr {
            Expression::Null(_) => Value::Null,
            Expression::Bool(value) => Value::Boolean(*value.value()),
            Expression::Number(number) => Value::try_from(number.value())?,
            Expression::String(value) => Value::String(value.value().clone()),
            Expression::Array(array) => Value::Array(
                array
                    .iter()
                    .map(|element| or_null(self.convert(element)))
                    .collect(),
            ),
            Expression::Object(object) => {
                let mut entries = indexmap::IndexMap::new();
                for (key, value) in object.iter() {
                    let key = match key {
                        ObjectKey::Ident(ident) => ident.as_str().to_string(),
                        ObjectKey::Expression(key_expr) => match self.render(key_expr) {
                            Ok(key) => key,
                            Err(error) => {
                                tracing::warn!(%error, "skipping object entry");
                                continue;
                            }
                        },
                    };

                    // last write wins
                    entries.insert(key, or_null(self.convert(value.expr())));
                }
                Value::Object(entries)
            }
            Expression::StringTemplate(template) => {
                self.render_template(template.into_iter(), expr)?.into()
            }
            Expression::HeredocTemplate(heredoc) => {
                self.render_template(heredoc.template.iter(), expr)?.into()
            }
            Expression::Variable(_) => self.quoted_source(expr)?.into(),
            Expression::Traversal(traversal) => {
                if is_verbatim(traversal) {
                    self.source(expr)?.into()
                } else {
                    self.quoted_source(expr)?.into()
                }
            }
            Expression::UnaryOp(_) | Expression::BinaryOp(_) => self.source(expr)?.into(),
            Expression::Conditional(conditional) => self.render_conditional(conditional)?.into(),
            Expression::ForExpr(for_expr) => self.render_for(for_expr)?.into(),
            Expression::FuncCall(func_call) => self.render_func_call(func_call)?.into(),
            Expression::Parenthesis(_) => self.wrap(expr)?.into(),
        };

        tracing::trace!(?value, "converted");
        Ok(value)
    }

    /// Render an expression in string context
    pub fn render(&self, expr: &Expression) -> Result<String, ConversionError> {
        match expr {
            Expression::Null(_) => Ok("null".to_string()),
            Expression::Bool(value) => Ok(value.value().to_string()),
            Expression::Number(number) => Ok(number.value().to_string()),
            Expression::String(value) => Ok(value.value().clone()),
            Expression::Array(_) | Expression::Object(_) => Ok(self.source(expr)?.to_string()),
            Expression::StringTemplate(template) => {
                self.render_template(template.into_iter(), expr)
            }
            Expression::HeredocTemplate(heredoc) => {
                self.render_template(heredoc.template.iter(), expr)
            }
            Expression::Variable(_)
            | Expression::Traversal(_)
            | Expression::UnaryOp(_)
            | Expression::BinaryOp(_) => self.quoted_source(expr),
            Expression::Conditional(conditional) => self.render_conditional(conditional),
            Expression::ForExpr(for_expr) => self.render_for(for_expr),
            Expression::FuncCall(func_call) => self.render_func_call(func_call),
            Expression::Parenthesis(_) => self.wrap(expr),
        }
    }

    fn render_template<'e>(
        &self,
        elements: impl Iterator<Item = &'e Element>,
        expr: &Expression,
    ) -> Result<String, ConversionError> {
        let mut rendered = String::new();
        for element in elements {
            match element {
                Element::Literal(literal) => rendered.push_str(literal.value()),
                Element::Interpolation(interpolation) => {
                    rendered.push_str(&self.render(&interpolation.expr)?)
                }
                // `%{if}` and `%{for}` directives are kept as they are
                Element::Directive(_) => return self.wrap(expr),
            }
        }

        Ok(rendered)
    }

    fn render_conditional(&self, conditional: &Conditional) -> Result<String, ConversionError> {
        let mut rendered = format!(
            "( {} ? {}",
            self.source(&conditional.cond_expr)?,
            self.render(&conditional.true_expr)?
        );

        let false_result = self.render(&conditional.false_expr)?;
        if !false_result.is_empty() {
            rendered.push_str(" : ");
            rendered.push_str(&false_result);
        }
        rendered.push_str(" )");

        Ok(rendered)
    }

    fn render_for(&self, for_expr: &ForExpr) -> Result<String, ConversionError> {
        let intro = &for_expr.intro;

        let mut rendered = String::from("%{for ");
        if let Some(key_var) = &intro.key_var {
            rendered.push_str(key_var.as_str());
            rendered.push_str(", ");
        }
        rendered.push_str(intro.value_var.as_str());
        rendered.push_str(" in ");
        rendered.push_str(self.source(&intro.collection_expr)?);
        rendered.push('}');
        rendered.push_str(&self.render(&for_expr.value_expr)?);
        rendered.push_str("%{endfor}");

        Ok(rendered)
    }

    fn render_func_call(&self, func_call: &FuncCall) -> Result<String, ConversionError> {
        let name = func_call
            .name
            .namespace
            .iter()
            .map(|namespace| namespace.as_str())
            .chain(std::iter::once(func_call.name.name.as_str()))
            .collect::<Vec<_>>()
            .join("::");

        let args = func_call
            .args
            .iter()
            .map(|arg| or_empty(self.render(arg)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("{name}({args})"))
    }

    /// Generic fallback for expressions without a dedicated rendering
    fn wrap(&self, expr: &Expression) -> Result<String, ConversionError> {
        Ok(format!("${{{}}}", self.source(expr)?))
    }

    /// Source text with `"` replaced by `'` so it embeds into a JSON string without escapes
    fn quoted_source(&self, expr: &Expression) -> Result<String, ConversionError> {
        Ok(self.source(expr)?.replace('"', "'"))
    }

    fn source(&self, expr: &Expression) -> Result<&'a str, ConversionError> {
        let span = expr
            .span()
            .ok_or(ConversionError::MissingSpan { what: "expression" })?;
        self.ranges.slice(&span)
    }
}

/// Traversals with splats or computed indices are kept verbatim
///
/// Attribute access and literal indices (`a.b`, `a[0]`, `a["b"]`) are plain traversals.
fn is_verbatim(traversal: &Traversal) -> bool {
    traversal
        .operators
        .iter()
        .any(|operator| match operator.value() {
            TraversalOperator::AttrSplat(_) | TraversalOperator::FullSplat(_) => true,
            TraversalOperator::Index(index) => {
                !matches!(index, Expression::Number(_) | Expression::String(_))
            }
            _ => false,
        })
}

fn or_null(result: Result<Value, ConversionError>) -> Value {
    result.unwrap_or_else(|error| {
        tracing::warn!(%error, "using null in place of an unconvertible value");
        Value::Null
    })
}

fn or_empty(result: Result<String, ConversionError>) -> String {
    result.unwrap_or_else(|error| {
        tracing::warn!(%error, "using an empty string in place of an unrenderable value");
        String::new()
    })
}
