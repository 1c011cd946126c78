//! DIMACS CNF parser and writer for the trisat SAT propagator.

use std::io;

use trisat_formula::{CnfFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: unexpected token in DIMACS CNF input: '{token}'")]
    UnexpectedToken { line: usize, token: String },
    #[error("line {line}: invalid header syntax: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: literal out of range: {value}")]
    LiteralOutOfRange { line: usize, value: isize },
    #[error("line {line}: unterminated clause at end of input")]
    UnterminatedClause { line: usize },
    #[error("formula has {var_count} variables while the header specifies {header_var_count}")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("formula has {clause_count} clauses while the header specifies {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
}

/// Variable and clause count of a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files.
#[derive(Default)]
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    line_number: usize,
    clause_count: usize,
}

impl DimacsParser {
    /// Parse a complete DIMACS CNF input.
    ///
    /// The header line is optional; when present the variable and clause counts of the
    /// formula are checked against it.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        use io::BufRead;

        let mut parser = DimacsParser::default();
        for line in io::BufReader::new(input).lines() {
            parser.parse_line(&line?)?;
        }
        parser.eof()
    }

    /// Parse a DIMACS CNF formula given as a string.
    pub fn parse_str(input: &str) -> Result<CnfFormula, Error> {
        Self::parse(input.as_bytes())
    }

    fn parse_line(&mut self, line: &str) -> Result<(), Error> {
        self.line_number += 1;

        let trimmed = line.trim_start();
        if trimmed.starts_with('c') {
            return Ok(());
        }
        if trimmed.starts_with('p') {
            return self.parse_header(trimmed);
        }

        for token in trimmed.split_whitespace() {
            let value: isize = token.parse().map_err(|_| ParserError::UnexpectedToken {
                line: self.line_number,
                token: token.to_owned(),
            })?;

            if value == 0 {
                self.formula.add_clause(self.partial_clause.drain(..));
                self.clause_count += 1;
            } else {
                if value.unsigned_abs() > Var::max_var().index() + 1 {
                    return Err(ParserError::LiteralOutOfRange {
                        line: self.line_number,
                        value,
                    }
                    .into());
                }
                self.partial_clause.push(Lit::from_dimacs(value));
            }
        }

        Ok(())
    }

    fn parse_header(&mut self, line: &str) -> Result<(), Error> {
        let invalid = || ParserError::InvalidHeader {
            line: self.line_number,
            header: line.trim_end().to_owned(),
        };

        if self.header.is_some() || self.clause_count > 0 || !self.partial_clause.is_empty() {
            return Err(invalid().into());
        }

        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("p") || tokens.next() != Some("cnf") {
            return Err(invalid().into());
        }

        let var_count: usize = tokens
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(invalid)?;
        let clause_count: usize = tokens
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(invalid)?;
        if tokens.next().is_some() {
            return Err(invalid().into());
        }

        if var_count > Var::max_var().index() + 1 {
            return Err(ParserError::LiteralOutOfRange {
                line: self.line_number,
                value: var_count as isize,
            }
            .into());
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });
        Ok(())
    }

    fn eof(mut self) -> Result<CnfFormula, Error> {
        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            }
            .into());
        }

        if let Some(header) = self.header {
            if self.formula.var_count() > header.var_count {
                return Err(ParserError::VarCount {
                    var_count: self.formula.var_count(),
                    header_var_count: header.var_count,
                }
                .into());
            }
            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                }
                .into());
            }
            self.formula.set_var_count(header.var_count);
        }

        Ok(self.formula)
    }
}

/// Write a formula as DIMACS CNF, including a header line.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    writeln!(target, "p cnf {} {}", formula.var_count(), formula.len())?;
    for clause in formula.iter() {
        for lit in clause {
            write!(target, "{} ", lit.to_dimacs())?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write an assignment as signed 1-based literals, one per line, with a `0` terminator.
pub fn write_solution(target: &mut impl io::Write, model: &[Lit]) -> io::Result<()> {
    for lit in model {
        writeln!(target, "{}", lit.to_dimacs())?;
    }
    target.write_all(b"0\n")
}
