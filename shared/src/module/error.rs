use thiserror::Error;

/// Structural problems that make a module impossible to analyze at all.
/// Unlike weave diagnostics these are never collected; they stop the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// Two types share a name
    #[error("Type {type_name} is declared more than once in module {module}")]
    DuplicateType { module: String, type_name: String },

    /// Two fields of one type share a name
    #[error("Field {field} is declared more than once on type {type_name}")]
    DuplicateField { type_name: String, field: String },

    /// Two methods of one type share a name. Overloads are not supported
    #[error("Method {method} is declared more than once on type {type_name}")]
    DuplicateMethod { type_name: String, method: String },

    /// The base type chain loops back on itself
    #[error("Type {type_name} has a cyclic base type chain")]
    CyclicBase { type_name: String },

    /// A jump lands outside the method body
    #[error("Jump to {target} in {method} is outside its body of {length} instructions")]
    JumpOutOfRange {
        method: String,
        target: usize,
        length: usize,
    },

    /// An argument index is larger than the method's argument count
    #[error("Argument {index} referenced in {method}, which takes {count} arguments")]
    ArgumentOutOfRange {
        method: String,
        index: u16,
        count: usize,
    },

    /// A local index is larger than the method's local count
    #[error("Local {index} referenced in {method}, which declares {count} locals")]
    LocalOutOfRange {
        method: String,
        index: u16,
        count: usize,
    },

    /// A lookup named a type that does not exist
    #[error("Type {type_name} not found in module")]
    TypeNotFound { type_name: String },

    /// A lookup named a method that does not exist
    #[error("Method {method} not found on type {type_name} or its bases")]
    MethodNotFound { type_name: String, method: String },
}
