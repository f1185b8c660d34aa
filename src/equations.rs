//! Incremental linear equation solving over exact rationals.
//!
//! Equations are added one at a time as a search discovers them; the system folds known values in
//! immediately and reports infeasibility as a plain return value so a caller can move on to the
//! next candidate cheaply.

use std::hash::Hash;

use indexmap::IndexMap;
use num::{BigInt, BigRational, One, Signed, Zero};

/// Arbitrary precision numerator over a positive divisor, always in lowest terms.
pub type Rational = BigRational;

/// `sum(coefficient * variable) + constant = 0`. Coefficients are never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation<V: Hash + Eq> {
    terms: IndexMap<V, Rational>,
    constant: Rational,
}

impl<V: Clone + Hash + Eq> Equation<V> {
    fn add_term(&mut self, var: V, factor: Rational) {
        if factor.is_zero() {
            return;
        }
        let entry = self.terms.entry(var.clone()).or_insert_with(Rational::zero);
        *entry += factor;
        if entry.is_zero() {
            self.terms.shift_remove(&var);
        }
    }

    /// `0 = 0`, carries no information.
    pub fn is_dead(&self) -> bool {
        self.terms.is_empty() && self.constant.is_zero()
    }

    /// `c = 0` with `c != 0`.
    pub fn is_impossible(&self) -> bool {
        self.terms.is_empty() && !self.constant.is_zero()
    }

    /// The variable and its value if exactly one variable is left.
    fn solution(&self) -> Option<(&V, Rational)> {
        if self.terms.len() != 1 {
            return None;
        }
        let (var, factor) = self.terms.first()?;
        Some((var, -&self.constant / factor))
    }

    fn substitute(&mut self, var: &V, value: &Rational) {
        if let Some(factor) = self.terms.shift_remove(var) {
            self.constant += factor * value;
        }
    }

    /// Subtracts the multiple of `pivot` that cancels `var` in `self`.
    fn eliminate(&mut self, var: &V, pivot: &Equation<V>) {
        let Some(factor) = self.terms.get(var) else {
            return;
        };
        let scale = factor / &pivot.terms[var];
        for (v, f) in &pivot.terms {
            self.add_term(v.clone(), -(&scale * f));
        }
        self.constant -= &scale * &pivot.constant;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// At least one variable was resolved or eliminated.
    Progress,
    /// Equations remain but none can be simplified further.
    Stuck,
    Impossible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every equation has been consumed.
    Solved,
    /// Not enough independent equations yet; more may be added.
    Stuck,
    Impossible,
}

/// A set of pending equations plus the values resolved so far.
///
/// `validator` decides whether a resolved value is acceptable for its variable (for example
/// integral, or non-negative for times). A rejected value makes the system impossible.
pub struct EquationSystem<V: Hash + Eq, F> {
    equations: Vec<Equation<V>>,
    values: IndexMap<V, Rational>,
    impossible: bool,
    validator: F,
}

impl<V, F> EquationSystem<V, F>
where
    V: Clone + Hash + Eq,
    F: Fn(&V, &Rational) -> bool,
{
    pub fn new(validator: F) -> Self {
        Self {
            equations: Vec::new(),
            values: IndexMap::new(),
            impossible: false,
            validator,
        }
    }

    pub fn is_impossible(&self) -> bool {
        self.impossible
    }

    pub fn pending(&self) -> usize {
        self.equations.len()
    }

    pub fn value(&self, var: &V) -> Option<&Rational> {
        self.values.get(var)
    }

    /// The value of `var` if it is known and integral.
    pub fn integer(&self, var: &V) -> Option<BigInt> {
        self.values
            .get(var)
            .filter(|v| v.is_integer())
            .map(|v| v.to_integer())
    }

    pub fn values(&self) -> impl Iterator<Item = (&V, &Rational)> {
        self.values.iter()
    }

    /// Adds `sum(coefficient * variable) + constant = 0` with integer coefficients.
    pub fn add_equation<I, C, K>(&mut self, terms: I, constant: K)
    where
        I: IntoIterator<Item = (V, C)>,
        C: Into<BigInt>,
        K: Into<BigInt>,
    {
        self.add_rational_equation(
            terms
                .into_iter()
                .map(|(v, c)| (v, Rational::from_integer(c.into()))),
            Rational::from_integer(constant.into()),
        );
    }

    /// Adds an equation; already resolved variables are folded into the constant right away.
    pub fn add_rational_equation<I>(&mut self, terms: I, constant: Rational)
    where
        I: IntoIterator<Item = (V, Rational)>,
    {
        let mut equation = Equation {
            terms: IndexMap::new(),
            constant,
        };
        for (var, factor) in terms {
            match self.values.get(&var) {
                Some(value) => equation.constant += &factor * value,
                None => equation.add_term(var, factor),
            }
        }

        if equation.is_impossible() {
            self.impossible = true;
        } else if !equation.is_dead() {
            self.equations.push(equation);
        }
    }

    /// Fixes `var` to `value` and substitutes it into every pending equation.
    ///
    /// Returns `false` (and marks the system impossible) if the validator rejects the value or it
    /// contradicts an earlier one.
    pub fn assign(&mut self, var: V, value: Rational) -> bool {
        if !(self.validator)(&var, &value) {
            self.impossible = true;
            return false;
        }
        if let Some(old) = self.values.get(&var) {
            if *old != value {
                self.impossible = true;
            }
            return !self.impossible;
        }

        for equation in &mut self.equations {
            equation.substitute(&var, &value);
        }
        self.values.insert(var, value);
        self.prune()
    }

    /// Drops dead equations; returns `false` if one became impossible.
    fn prune(&mut self) -> bool {
        if self.equations.iter().any(Equation::is_impossible) {
            self.impossible = true;
        }
        self.equations.retain(|e| !e.is_dead());
        !self.impossible
    }

    /// Resolves every equation with a single variable left, substituting each value as it goes.
    /// Falls back to [`EquationSystem::eliminate`] when there is none.
    pub fn reduce(&mut self) -> Reduction {
        if self.impossible {
            return Reduction::Impossible;
        }

        let mut progress = false;
        while let Some(index) = self.equations.iter().position(|e| e.terms.len() == 1) {
            let equation = self.equations.remove(index);
            let Some((var, value)) = equation.solution() else {
                continue;
            };
            if !self.assign(var.clone(), value) {
                return Reduction::Impossible;
            }
            progress = true;
        }

        if progress || self.eliminate() {
            Reduction::Progress
        } else if self.impossible {
            Reduction::Impossible
        } else {
            Reduction::Stuck
        }
    }

    /// One Gauss-Jordan step: picks a pivot and removes its variable from every other equation.
    ///
    /// Only equations that do not yet own a variable (one appearing nowhere else) may serve as
    /// pivot, which guarantees termination. Pivots with coefficient ±1 are preferred; any other
    /// non-zero coefficient is exact over rationals too.
    pub fn eliminate(&mut self) -> bool {
        let mut occurrences: IndexMap<&V, usize> = IndexMap::new();
        for equation in &self.equations {
            for var in equation.terms.keys() {
                *occurrences.entry(var).or_default() += 1;
            }
        }

        let mut chosen: Option<(usize, &V)> = None;
        'search: for (index, equation) in self.equations.iter().enumerate() {
            if equation.terms.keys().any(|v| occurrences[v] == 1) {
                continue;
            }
            for (var, factor) in &equation.terms {
                if occurrences[var] < 2 {
                    continue;
                }
                if factor.abs().is_one() {
                    chosen = Some((index, var));
                    break 'search;
                }
                chosen.get_or_insert((index, var));
            }
        }
        let Some((index, var)) = chosen else {
            return false;
        };
        let var = var.clone();

        let pivot = self.equations[index].clone();
        for (i, equation) in self.equations.iter_mut().enumerate() {
            if i != index {
                equation.eliminate(&var, &pivot);
            }
        }
        self.prune();
        true
    }

    /// Reduces until no equation is left, the system turns out impossible or nothing more can be
    /// derived.
    pub fn solve(&mut self) -> Outcome {
        loop {
            if self.impossible {
                return Outcome::Impossible;
            }
            if self.equations.is_empty() {
                return Outcome::Solved;
            }
            match self.reduce() {
                Reduction::Progress => {}
                Reduction::Stuck => return Outcome::Stuck,
                Reduction::Impossible => return Outcome::Impossible,
            }
        }
    }
}

/// Accepts only integral values.
pub fn integral<V>(_: &V, value: &Rational) -> bool {
    value.is_integer()
}
