//! Mixed-kind readings for aggregations that combine different sources.

use super::fanout::Collected;
use crate::errors::AggregateError;
use crate::models::ExchangeResult;

/// A single source reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Number(f64),
    Exchange(ExchangeResult),
}

impl Collected<Reading> {
    /// Take a numeric reading. A reading of another kind counts as missing.
    pub fn number(&mut self, name: &'static str) -> Result<f64, AggregateError> {
        match self.take(name)? {
            Reading::Number(value) => Ok(value),
            Reading::Exchange(_) => Err(AggregateError::MissingReading(name)),
        }
    }

    /// Take an exchange reading. A reading of another kind counts as missing.
    pub fn exchange(&mut self, name: &'static str) -> Result<ExchangeResult, AggregateError> {
        match self.take(name)? {
            Reading::Exchange(result) => Ok(result),
            Reading::Number(_) => Err(AggregateError::MissingReading(name)),
        }
    }
}
