//! Verbosity flags for the compile pipeline.
//!
//! These are a plain record built once by the CLI driver and passed by
//! reference into [`crate::compile_with_diagnostics`] — nothing in this
//! crate reads a `static` or an environment variable to decide whether to
//! trace.

/// Which stages of the pipeline should write trace lines to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticOptions {
    /// Trace symbol table inserts and lookups during the symbol pass.
    pub trace_symbols: bool,
    /// Trace property/binding dependency edges and the resulting init order.
    pub trace_bindings: bool,
    /// Trace scope creation for components, methods, and instances.
    pub trace_scopes: bool,
    /// Trace the parser's speculative ("try this rule, backtrack on miss")
    /// decisions between a struct literal and a component instantiation.
    pub trace_parser: bool,
    /// Print every emitted assembly line as it's produced.
    pub trace_assembly: bool,
}

impl DiagnosticOptions {
    /// True if any trace flag is set, used to skip building trace strings
    /// when nothing will print them.
    pub fn any(&self) -> bool {
        self.trace_symbols || self.trace_bindings || self.trace_scopes || self.trace_parser || self.trace_assembly
    }
}
