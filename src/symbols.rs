//! Names a parse is allowed to resolve.

use std::collections::BTreeMap;

use crate::expr::{Expr, one, pow, rational};

/// Elementary functions the parser recognizes by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Sin,
    Cos,
    Tan,
    Atan,
    Sinh,
    Cosh,
    Exp,
    Log,
    Abs,
    Sqrt,
}

impl FunctionKind {
    pub fn apply(self, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match self {
            FunctionKind::Sin => Expr::Sin(arg),
            FunctionKind::Cos => Expr::Cos(arg),
            FunctionKind::Tan => Expr::Tan(arg),
            FunctionKind::Atan => Expr::Atan(arg),
            FunctionKind::Sinh => Expr::Sinh(arg),
            FunctionKind::Cosh => Expr::Cosh(arg),
            FunctionKind::Exp => Expr::Exp(arg),
            FunctionKind::Log => Expr::Log(arg),
            FunctionKind::Abs => Expr::Abs(arg),
            FunctionKind::Sqrt => pow(*arg, Expr::Constant(rational(1, 2))),
        }
    }
}

/// Independent variable, dependent function and registered function names for one request.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    independent: String,
    dependent: String,
    functions: BTreeMap<&'static str, FunctionKind>,
}

impl SymbolTable {
    pub fn standard(independent: impl Into<String>, dependent: impl Into<String>) -> Self {
        let functions = BTreeMap::from([
            ("sin", FunctionKind::Sin),
            ("cos", FunctionKind::Cos),
            ("tan", FunctionKind::Tan),
            ("atan", FunctionKind::Atan),
            ("arctan", FunctionKind::Atan),
            ("sinh", FunctionKind::Sinh),
            ("cosh", FunctionKind::Cosh),
            ("exp", FunctionKind::Exp),
            ("log", FunctionKind::Log),
            ("ln", FunctionKind::Log),
            ("abs", FunctionKind::Abs),
            ("sqrt", FunctionKind::Sqrt),
        ]);
        Self {
            independent: independent.into(),
            dependent: dependent.into(),
            functions,
        }
    }

    pub fn independent(&self) -> &str {
        &self.independent
    }

    pub fn dependent(&self) -> &str {
        &self.dependent
    }

    pub fn function(&self, name: &str) -> Option<FunctionKind> {
        self.functions.get(name).copied()
    }

    /// `y(x)`.
    pub fn unknown(&self) -> Expr {
        Expr::apply(self.dependent.clone(), Expr::var(self.independent.clone()))
    }

    /// `y^(order)(x)`.
    pub fn unknown_derivative(&self, order: u32) -> Expr {
        if order == 0 {
            self.unknown()
        } else {
            Expr::derivative(self.unknown(), self.independent.clone(), order)
        }
    }

    /// Value of a bare identifier, or `None` when it is not a known symbol.
    pub fn resolve(&self, name: &str) -> Option<Expr> {
        if name == self.dependent {
            Some(self.unknown())
        } else if name == self.independent {
            Some(Expr::var(name))
        } else if name == "e" {
            Some(Expr::Exp(one().boxed()))
        } else {
            None
        }
    }

    /// Whether a multi-letter identifier should stay whole instead of splitting into letters.
    pub fn is_known_name(&self, name: &str) -> bool {
        name == self.independent || name == self.dependent || self.functions.contains_key(name)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::standard("x", "y")
    }
}
