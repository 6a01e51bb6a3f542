//! Compiled jq programs.
//!
//! Wraps `jaq` so the rest of the proxy only sees `serde_json::Value` in and
//! out. Values cross the boundary through their JSON text form.

use std::fmt;

use jaq_core::load::{Arena, File, Loader};
use jaq_core::{Compiler, Ctx, Filter, Native, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Errors raised while compiling or running a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The expression could not be lexed or parsed.
    #[error("jq parse: {0}")]
    Parse(String),

    /// The expression parsed but references unknown filters or variables.
    #[error("jq compile: {0}")]
    Compile(String),

    /// The program raised an error while evaluating an input.
    #[error("{0}")]
    Runtime(String),

    /// A produced value has no JSON representation.
    #[error("jq output: {0}")]
    Output(#[source] serde_json::Error),
}

/// A compiled query, reusable across any number of concurrent runs.
pub struct QueryProgram {
    source: String,
    filter: Filter<Native<Val>>,
}

impl QueryProgram {
    /// Parse and compile `source` with the jq standard library in scope.
    pub fn compile(source: &str) -> Result<Self, QueryError> {
        let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
        let arena = Arena::default();
        let program = File {
            code: source,
            path: (),
        };

        let modules = loader.load(&arena, program).map_err(|errs| {
            QueryError::Parse(
                errs.into_iter()
                    .map(|(_, err)| format!("{err:?}"))
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        let filter = Compiler::default()
            .with_funs(jaq_std::funs().chain(jaq_json::funs()))
            .compile(modules)
            .map_err(|errs| {
                QueryError::Compile(
                    errs.into_iter()
                        .map(|(_, undefined)| format!("{undefined:?}"))
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            })?;

        Ok(Self {
            source: source.to_string(),
            filter,
        })
    }

    /// The expression this program was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run the program against `input` and return its first output.
    ///
    /// `Ok(None)` means the program produced no output at all. A runtime error
    /// in the first output is returned as [`QueryError::Runtime`]; outputs
    /// after the first are never evaluated.
    pub fn run_first(&self, input: Value) -> Result<Option<Value>, QueryError> {
        let inputs = RcIter::new(core::iter::empty());
        let mut outputs = self.filter.run((Ctx::new([], &inputs), Val::from(input)));

        match outputs.next() {
            None => Ok(None),
            Some(Err(err)) => Err(QueryError::Runtime(err.to_string())),
            Some(Ok(val)) => serde_json::from_str(&val.to_string())
                .map(Some)
                .map_err(QueryError::Output),
        }
    }
}

impl fmt::Debug for QueryProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryProgram")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
