//! Two level symbol table.
use smol_str::SmolStr;
use std::{collections::BTreeMap, fmt};

use crate::{error::SymbolError, ir::Segment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Primitive type name (`int`, `char`, `boolean`) or a class name.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    /// Position among the symbols of the same kind.
    pub index: u16,
}

impl Symbol {
    #[inline]
    pub fn segment(&self) -> Segment {
        self.kind.segment()
    }
}

/// Declaration category of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Class variable shared by all instances.
    Static,
    /// Instance variable.
    Field,
    /// Subroutine parameter.
    Arg,
    /// Subroutine local variable.
    Var,
}

impl SymbolKind {
    /// Memory segment the VM addresses variables of this kind through.
    #[rustfmt::skip]
    pub fn segment(self) -> Segment {
        match self {
            Self::Static => Segment::Static,
            Self::Field  => Segment::This,
            Self::Arg    => Segment::Argument,
            Self::Var    => Segment::Local,
        }
    }

    #[rustfmt::skip]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Field  => "field",
            Self::Arg    => "argument",
            Self::Var    => "local",
        }
    }

    pub fn scope(self) -> SymbolScope {
        match self {
            Self::Static | Self::Field => SymbolScope::Class,
            Self::Arg | Self::Var => SymbolScope::Subroutine,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// Lives as long as the class being compiled.
    Class,
    /// Rebuilt for every subroutine.
    Subroutine,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class: BTreeMap<SmolStr, Symbol>,
    subroutine: BTreeMap<SmolStr, Symbol>,
    /// Number of symbols defined per kind, indexed by [`SymbolKind`].
    counts: [u16; 4],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, ready for a new class.
    pub fn start_class(&mut self) {
        self.class.clear();
        self.subroutine.clear();
        self.counts = [0; 4];
    }

    /// Clear the subroutine scope.
    ///
    /// Methods pass the class name as their receiver type, which declares
    /// `this` as argument 0 ahead of any declared parameters.
    pub fn start_subroutine(&mut self, receiver: Option<&str>) {
        self.subroutine.clear();
        self.counts[SymbolKind::Arg as usize] = 0;
        self.counts[SymbolKind::Var as usize] = 0;

        if let Some(class_name) = receiver {
            // Scope was just cleared, so this can't collide.
            let _ = self.define("this", class_name, SymbolKind::Arg);
        }
    }

    /// Declare a new symbol and return its index.
    ///
    /// Names must be unique within their scope, but a subroutine
    /// may shadow a class level name. Indices are `u16`, so at most
    /// 65535 symbols of one kind can be defined.
    pub fn define(
        &mut self,
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        kind: SymbolKind,
    ) -> Result<u16, SymbolError> {
        let name = name.into();
        let index = self.count_of(kind);
        let scope = self.scope_mut(kind.scope());

        if scope.contains_key(&name) {
            return Err(SymbolError::Duplicate(name));
        }
        if index == u16::MAX {
            return Err(SymbolError::Overflow(kind));
        }

        scope.insert(
            name.clone(),
            Symbol {
                name,
                ty: ty.into(),
                kind,
                index,
            },
        );

        self.counts[kind as usize] = index + 1;

        Ok(index)
    }

    /// Look the name up in the subroutine scope, then the class scope.
    #[inline]
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.subroutine.get(name).or_else(|| self.class.get(name))
    }

    /// Number of symbols of the given kind in the scope the kind belongs to.
    #[inline]
    pub fn count_of(&self, kind: SymbolKind) -> u16 {
        self.counts[kind as usize]
    }

    fn scope_mut(&mut self, scope: SymbolScope) -> &mut BTreeMap<SmolStr, Symbol> {
        match scope {
            SymbolScope::Class => &mut self.class,
            SymbolScope::Subroutine => &mut self.subroutine,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_indices_per_kind() {
        let mut table = SymbolTable::new();
        assert_eq!(table.define("count", "int", SymbolKind::Static), Ok(0));
        assert_eq!(table.define("x", "int", SymbolKind::Field), Ok(0));
        assert_eq!(table.define("y", "int", SymbolKind::Field), Ok(1));
        assert_eq!(table.define("max", "int", SymbolKind::Static), Ok(1));

        table.start_subroutine(None);
        assert_eq!(table.define("a", "int", SymbolKind::Arg), Ok(0));
        assert_eq!(table.define("i", "int", SymbolKind::Var), Ok(0));
        assert_eq!(table.define("b", "Point", SymbolKind::Arg), Ok(1));

        assert_eq!(table.count_of(SymbolKind::Field), 2);
        assert_eq!(table.count_of(SymbolKind::Static), 2);
        assert_eq!(table.count_of(SymbolKind::Arg), 2);
        assert_eq!(table.count_of(SymbolKind::Var), 1);

        let b = table.resolve("b").unwrap();
        assert_eq!(b.ty, "Point");
        assert_eq!(b.segment(), Segment::Argument);
        assert_eq!(b.index, 1);
    }

    #[test]
    fn test_method_receiver() {
        let mut table = SymbolTable::new();
        table.start_subroutine(Some("Square"));
        assert_eq!(table.define("dx", "int", SymbolKind::Arg), Ok(1));

        let this = table.resolve("this").unwrap();
        assert_eq!(this.ty, "Square");
        assert_eq!(this.kind, SymbolKind::Arg);
        assert_eq!(this.index, 0);

        // Next subroutine is a function, so the receiver is gone.
        table.start_subroutine(None);
        assert!(table.resolve("this").is_none());
        assert!(table.resolve("dx").is_none());
        assert_eq!(table.define("dx", "int", SymbolKind::Arg), Ok(0));
    }

    #[test]
    fn test_shadowing() {
        let mut table = SymbolTable::new();
        table.define("size", "int", SymbolKind::Field).unwrap();
        table.start_subroutine(None);
        table.define("size", "char", SymbolKind::Var).unwrap();

        let size = table.resolve("size").unwrap();
        assert_eq!(size.kind, SymbolKind::Var);
        assert_eq!(size.segment(), Segment::Local);

        table.start_subroutine(None);
        assert_eq!(table.resolve("size").unwrap().segment(), Segment::This);
    }

    #[test]
    fn test_duplicate() {
        let mut table = SymbolTable::new();
        table.define("x", "int", SymbolKind::Field).unwrap();
        assert_eq!(
            table.define("x", "int", SymbolKind::Static),
            Err(SymbolError::Duplicate("x".into()))
        );

        table.start_subroutine(None);
        table.define("i", "int", SymbolKind::Arg).unwrap();
        assert_eq!(
            table.define("i", "int", SymbolKind::Var),
            Err(SymbolError::Duplicate("i".into()))
        );
        // The rejected definition took no index.
        assert_eq!(table.count_of(SymbolKind::Var), 0);
    }

    #[test]
    fn test_undefined() {
        let table = SymbolTable::new();
        assert!(table.resolve("Output").is_none());
    }

    #[test]
    #[rustfmt::skip]
    fn test_segment_mapping() {
        assert_eq!(SymbolKind::Static.segment(), Segment::Static);
        assert_eq!(SymbolKind::Field.segment(),  Segment::This);
        assert_eq!(SymbolKind::Arg.segment(),    Segment::Argument);
        assert_eq!(SymbolKind::Var.segment(),    Segment::Local);
    }

    #[test]
    fn test_start_class() {
        let mut table = SymbolTable::new();
        table.define("x", "int", SymbolKind::Field).unwrap();
        table.start_subroutine(Some("A"));
        table.start_class();
        assert!(table.resolve("x").is_none());
        assert!(table.resolve("this").is_none());
        assert_eq!(table.count_of(SymbolKind::Field), 0);
    }

    #[test]
    fn test_index_limit() {
        let mut table = SymbolTable::new();
        for i in 0..u16::MAX {
            assert_eq!(table.define(format!("s{i}"), "int", SymbolKind::Static), Ok(i));
        }
        assert_eq!(table.count_of(SymbolKind::Static), u16::MAX);
        assert_eq!(
            table.define("one_more", "int", SymbolKind::Static),
            Err(SymbolError::Overflow(SymbolKind::Static))
        );
        assert_eq!(table.count_of(SymbolKind::Static), u16::MAX);

        // Other kinds count on their own.
        assert_eq!(table.define("x", "int", SymbolKind::Field), Ok(0));
    }
}
