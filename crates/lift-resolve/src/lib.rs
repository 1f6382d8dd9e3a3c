//! Name resolution for Lift scripts.
//!
//! [`SymbolIndex::build`] walks a parsed file once, building a scope tree
//! (file, function, class and block scopes), the declarations each scope
//! introduces, and every name reference resolved to its declaration.
//!
//! Lookup is lexical and position-independent: a name resolves to the nearest
//! enclosing scope that declares it, wherever the declaration appears in that
//! scope. `var` bindings are hoisted to the enclosing function (or file);
//! `let`/`const` bind in the innermost block.

mod index;

pub use index::{
    LocalSymbolId, ReferenceData, ScopeData, ScopeId, ScopeKind, SymbolData, SymbolIndex,
    SymbolKind,
};
