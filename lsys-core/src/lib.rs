//! L-system language compiler, growth engine and geometric realization.
//!
//! ```text
//! source ─parse→ Program ─compile→ Specification + Application
//!        ─intern→ Specification<usize> ─plan/realize→ Realization
//! ```

pub mod ast;
pub mod compiler;
pub mod constants;
pub mod error;
pub mod expr;
pub mod function;
pub mod growth;
pub mod parser;
pub mod program;
pub mod realize;
pub mod scanner;
pub mod system;
pub mod token;

pub use compiler::{compile, compile_source, CompileOutput};
pub use constants::Overrides;
pub use error::{CompilerError, ErrorKind, InternError, Severity};
pub use growth::{IterationPlan, RealizeOptions};
pub use realize::{optimize_and_apply, realize, InstanceBatch, Realization};
pub use system::{Application, Specification};
