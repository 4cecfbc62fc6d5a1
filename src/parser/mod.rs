//! Parser for Turtle BASIC statements and expressions
//!
//! Turns a tokenized statement into a `Statement` whose shape the executor
//! dispatches on. Expressions use the usual precedence: unary sign, then
//! `* /`, then `+ -`, then the relational operators, all left-associative.

use crate::error::{BasicError, Result};
use crate::tokenizer::{Token, TokenizedLine};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl BinaryOperator {
    fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Operator("+") => Some(BinaryOperator::Add),
            Token::Operator("-") => Some(BinaryOperator::Subtract),
            Token::Operator("*") => Some(BinaryOperator::Multiply),
            Token::Operator("/") => Some(BinaryOperator::Divide),
            Token::Operator("=") => Some(BinaryOperator::Equal),
            Token::Operator("<>") => Some(BinaryOperator::NotEqual),
            Token::Operator("<") => Some(BinaryOperator::LessThan),
            Token::Operator("<=") => Some(BinaryOperator::LessThanOrEqual),
            Token::Operator(">") => Some(BinaryOperator::GreaterThan),
            Token::Operator(">=") => Some(BinaryOperator::GreaterThanOrEqual),
            _ => None,
        }
    }

    /// Binding strength; higher binds tighter
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide => 3,
            BinaryOperator::Add | BinaryOperator::Subtract => 2,
            _ => 1,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == 1
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
    /// Variable reference
    Variable(String),
    /// Binary operation
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

/// Print item types for PRINT statements
#[derive(Debug, Clone, PartialEq)]
pub enum PrintItem {
    Expression(Expression),
    Semicolon, // ;
    Comma,     // ,
}

/// Colour argument of PEN and BG
#[derive(Debug, Clone, PartialEq)]
pub enum ColorArg {
    /// A bare word: palette name, or failing that a variable
    Named(String),
    /// Any other expression, evaluated to a palette index
    Expression(Expression),
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable assignment (LET A = 5 or A = 5)
    Let {
        variable: String,
        expression: Expression,
    },
    /// PRINT statement
    Print { items: Vec<PrintItem> },
    /// GOTO statement
    Goto { target: Expression },
    /// IF cond THEN statement (a bare line number is a GOTO)
    If {
        condition: Expression,
        then_part: Box<Statement>,
    },
    /// FOR loop
    For {
        variable: String,
        start: Expression,
        end: Expression,
        step: Option<Expression>,
    },
    /// NEXT statement
    Next { variable: Option<String> },
    /// REM statement (comment)
    Rem,
    /// END statement
    End,
    /// FD distance
    Forward { distance: Expression },
    /// BK distance
    Back { distance: Expression },
    /// RT degrees
    Right { degrees: Expression },
    /// LT degrees
    Left { degrees: Expression },
    /// GO x y
    Go { x: Expression, y: Expression },
    PenUp,
    PenDown,
    /// PEN colour
    Pen { color: ColorArg },
    /// BG colour
    Background { color: ColorArg },
    /// THICK width
    Thick { width: Expression },
    /// CIRCLE radius
    Circle { radius: Expression },
    List,
    /// RUN [line]
    Run { start: Option<Expression> },
    New,
    Save { name: Expression },
    Load { name: Expression },
    /// DIR or FILES
    Dir,
    /// Empty statement
    Empty,
}

/// Words that end an expression instead of naming a variable
const RESERVED: &[&str] = &["TO", "STEP", "THEN"];

/// Cursor over the tokens of one statement
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    /// Fail if anything is left over
    fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(BasicError::syntax(format!("unexpected {}", token))),
        }
    }

    fn expect_operator(&mut self, op: &str) -> Result<()> {
        match self.advance() {
            Some(token) if token.is_operator(op) => Ok(()),
            Some(token) => Err(BasicError::syntax(format!(
                "expected {} but found {}",
                op, token
            ))),
            None => Err(BasicError::syntax(format!("expected {}", op))),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.advance() {
            Some(token) if token.is_keyword(keyword) => Ok(()),
            Some(token) => Err(BasicError::syntax(format!(
                "expected {} but found {}",
                keyword, token
            ))),
            None => Err(BasicError::syntax(format!("expected {}", keyword))),
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_separator(&mut self, separator: char) -> bool {
        if self.peek() == Some(&Token::Separator(separator)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn variable_name(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Identifier(name)) if !RESERVED.contains(&name.as_str()) => {
                Ok(name.clone())
            }
            Some(token) => Err(BasicError::syntax(format!(
                "expected variable name but found {}",
                token
            ))),
            None => Err(BasicError::syntax("expected variable name")),
        }
    }

    /// Precedence climbing over the binary operators
    fn expression(&mut self) -> Result<Expression> {
        self.binary(1)
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expression> {
        let mut left = self.unary()?;

        while let Some(op) = self.peek().and_then(BinaryOperator::from_token) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let right = self.binary(precedence + 1)?;
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression> {
        let op = match self.peek() {
            Some(Token::Operator("-")) => Some(UnaryOperator::Minus),
            Some(Token::Operator("+")) => Some(UnaryOperator::Plus),
            _ => None,
        };

        match op {
            Some(op) => {
                self.pos += 1;
                let operand = self.unary()?;
                Ok(Expression::UnaryOp {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expression::Number(*n)),
            Some(Token::String(s)) => Ok(Expression::String(s.clone())),
            Some(Token::Identifier(name)) if !RESERVED.contains(&name.as_str()) => {
                Ok(Expression::Variable(name.clone()))
            }
            Some(Token::Operator("(")) => {
                let inner = self.expression()?;
                self.expect_operator(")")?;
                Ok(inner)
            }
            Some(Token::BadNumber(_)) => Err(BasicError::value("bad numeric literal")),
            Some(token) => Err(BasicError::syntax(format!("unexpected {}", token))),
            None => Err(BasicError::syntax("missing expression")),
        }
    }
}

/// Parse a complete token slice as one expression
pub fn parse_expression(tokens: &[Token]) -> Result<Expression> {
    let mut parser = Parser::new(tokens);
    let expr = parser.expression()?;
    parser.finish()?;
    Ok(expr)
}

/// Parse a tokenized statement
pub fn parse_statement(line: &TokenizedLine) -> Result<Statement> {
    parse_tokens(&line.tokens)
}

fn parse_tokens(tokens: &[Token]) -> Result<Statement> {
    let keyword = match tokens.first() {
        None => return Ok(Statement::Empty),
        Some(Token::Identifier(word)) => word.as_str(),
        Some(_) => return Err(BasicError::syntax("unknown command")),
    };

    let mut parser = Parser::new(&tokens[1..]);

    let statement = match keyword {
        "REM" => return Ok(Statement::Rem),
        "LET" => parse_assignment(&mut parser)?,
        "PRINT" => parse_print(&mut parser)?,
        "GOTO" => Statement::Goto {
            target: parser.expression()?,
        },
        "IF" => return parse_if(&mut parser),
        "FOR" => parse_for(&mut parser)?,
        "NEXT" => {
            let variable = if parser.at_end() {
                None
            } else {
                Some(parser.variable_name()?)
            };
            Statement::Next { variable }
        }
        "END" => Statement::End,
        "FD" => Statement::Forward {
            distance: parser.expression()?,
        },
        "BK" => Statement::Back {
            distance: parser.expression()?,
        },
        "RT" => Statement::Right {
            degrees: parser.expression()?,
        },
        "LT" => Statement::Left {
            degrees: parser.expression()?,
        },
        "GO" => {
            let x = parser.expression()?;
            parser.eat_separator(',');
            if parser.at_end() {
                return Err(BasicError::syntax("GO needs x and y"));
            }
            let y = parser.expression()?;
            Statement::Go { x, y }
        }
        "PU" => Statement::PenUp,
        "PD" => Statement::PenDown,
        "PEN" => Statement::Pen {
            color: parse_color(&mut parser)?,
        },
        "BG" => Statement::Background {
            color: parse_color(&mut parser)?,
        },
        "THICK" => Statement::Thick {
            width: parser.expression()?,
        },
        "CIRCLE" => Statement::Circle {
            radius: parser.expression()?,
        },
        "LIST" => Statement::List,
        "RUN" => {
            let start = if parser.at_end() {
                None
            } else {
                Some(parser.expression()?)
            };
            Statement::Run { start }
        }
        "NEW" => Statement::New,
        "SAVE" => Statement::Save {
            name: parse_program_name(&mut parser)?,
        },
        "LOAD" => Statement::Load {
            name: parse_program_name(&mut parser)?,
        },
        "DIR" | "FILES" => Statement::Dir,
        _ if tokens.get(1).is_some_and(|t| t.is_operator("=")) => {
            // Implicit LET
            let mut parser = Parser::new(tokens);
            let statement = parse_assignment(&mut parser)?;
            parser.finish()?;
            return Ok(statement);
        }
        _ => return Err(BasicError::syntax("unknown command")),
    };

    parser.finish()?;
    Ok(statement)
}

fn parse_assignment(parser: &mut Parser<'_>) -> Result<Statement> {
    let variable = parser.variable_name()?;
    parser.expect_operator("=")?;
    let expression = parser.expression()?;
    Ok(Statement::Let {
        variable,
        expression,
    })
}

fn parse_print(parser: &mut Parser<'_>) -> Result<Statement> {
    let mut items = Vec::new();
    while !parser.at_end() {
        if parser.eat_separator(';') {
            items.push(PrintItem::Semicolon);
        } else if parser.eat_separator(',') {
            items.push(PrintItem::Comma);
        } else {
            items.push(PrintItem::Expression(parser.expression()?));
        }
    }
    Ok(Statement::Print { items })
}

fn parse_if(parser: &mut Parser<'_>) -> Result<Statement> {
    let condition = parser.expression()?;
    parser.expect_keyword("THEN")?;

    let rest = parser.rest();
    let then_part = match rest {
        [] => return Err(BasicError::syntax("IF needs a statement after THEN")),
        [Token::Number(n)] => Statement::Goto {
            target: Expression::Number(*n),
        },
        _ => parse_tokens(rest)?,
    };

    Ok(Statement::If {
        condition,
        then_part: Box::new(then_part),
    })
}

fn parse_for(parser: &mut Parser<'_>) -> Result<Statement> {
    let variable = parser.variable_name()?;
    parser.expect_operator("=")?;
    let start = parser.expression()?;
    parser.expect_keyword("TO")?;
    let end = parser.expression()?;
    let step = if parser.eat_keyword("STEP") {
        Some(parser.expression()?)
    } else {
        None
    };
    Ok(Statement::For {
        variable,
        start,
        end,
        step,
    })
}

fn parse_color(parser: &mut Parser<'_>) -> Result<ColorArg> {
    if let [Token::Identifier(name)] = parser.rest() {
        parser.advance();
        return Ok(ColorArg::Named(name.clone()));
    }
    Ok(ColorArg::Expression(parser.expression()?))
}

/// SAVE and LOAD take a string, or a bare word used as the name
fn parse_program_name(parser: &mut Parser<'_>) -> Result<Expression> {
    if let [Token::Identifier(name)] = parser.rest() {
        parser.advance();
        return Ok(Expression::String(name.clone()));
    }
    if parser.at_end() {
        return Err(BasicError::syntax("missing program name"));
    }
    parser.expression()
}
