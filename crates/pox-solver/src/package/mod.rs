// Package model consumed by rule generation
//
// Packages are read-only during generation. The pool assigns each package
// (and each alias) a stable integer id that is used as a SAT literal.

mod alias;
mod link;
mod package;

pub use alias::AliasPackage;
pub use link::{Link, LinkType};
pub use package::{Package, Stability};
