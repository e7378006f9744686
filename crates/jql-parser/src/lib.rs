#![doc = include_str!("../README.md")]

pub mod ast;
mod error;
mod lexer;
mod message;
mod net;
mod parser;
mod pos;
mod validate;
mod visitor;
mod warnings;

pub use crate::error::ParseError;
pub use crate::lexer::Lexer;
pub use crate::lexer::Token;
pub use crate::lexer::TokenKind;
pub use crate::message::MessageTape;
pub use crate::message::ParserMessage;
pub use crate::message::Severity;
pub use crate::net::Ipv4Net;
pub use crate::parser::parse;
pub use crate::parser::parse_query;
pub use crate::parser::QueryParser;
pub use crate::pos::Pos;
pub use crate::validate::op_validator;
pub use crate::visitor::walk;
pub use crate::visitor::Flow;
pub use crate::visitor::MessageVisitor;
pub use crate::visitor::Visitor;
pub use crate::warnings::warning_visitor;
