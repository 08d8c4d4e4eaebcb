//! Budget-indexed grammar.
//!
//! Each nonterminal stands for "a term that has already consumed `used[i]`
//! uses of kind `i`". Applying kind `i` moves its operands to the successor
//! nonterminal, so a derivation can never exceed the library's counts.
use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet, VecDeque},
    fmt,
};

use log::trace;

use super::library::{KindForm, Library};
use crate::{bits, term::Term};

pub const VAR: &str = "Var";
pub const CONST: &str = "Const";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonterminal {
    pub name: String,
    pub sort: Term,
    pub productions: Vec<Term>,
}

impl Nonterminal {
    pub fn to_term(&self) -> Term {
        Term::list([
            Term::atom(self.name.as_str()),
            self.sort.clone(),
            Term::list(self.productions.iter().cloned()),
        ])
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

/// `Start_<c0>_<c1>...`, or `Start` for an empty vector.
pub fn nonterminal_name(used: &[u32]) -> String {
    let mut name = "Start".to_string();
    for count in used {
        name.push('_');
        name.push_str(&count.to_string());
    }
    name
}

/// Every vector reachable from zero by incrementing one component at a time
/// without exceeding `budgets`, in breadth-first order.
pub fn reachable_vectors(budgets: &[u32]) -> Vec<Vec<u32>> {
    let start = vec![0; budgets.len()];
    let mut visited = HashSet::from([start.clone()]);
    let mut queue = VecDeque::from([start]);
    let mut order = Vec::new();

    while let Some(used) = queue.pop_front() {
        for (i, budget) in budgets.iter().enumerate() {
            if used[i] < *budget {
                let mut next = used.clone();
                next[i] += 1;
                if visited.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        order.push(used);
    }
    order
}

/// Largest number of uses of each kind a single derivation from the zero
/// vector can contain.
///
/// Every operand of a wrapper is drawn from the same successor nonterminal,
/// so a kind of arity two declared `k` times fits `2^k - 1` times in one
/// tree. Vectors are visited in reverse breadth-first order, which puts every
/// successor before the vector it was reached from.
pub fn worst_case_uses(budgets: &[u32], arities: &[usize]) -> Vec<u64> {
    let vectors = reachable_vectors(budgets);
    let mut uses: HashMap<Vec<u32>, Vec<u64>> = HashMap::with_capacity(vectors.len());

    for used in vectors.into_iter().rev() {
        let mut most = vec![0u64; budgets.len()];
        for (k, budget) in budgets.iter().enumerate() {
            if used[k] >= *budget {
                continue;
            }
            let mut next = used.clone();
            next[k] += 1;
            let Some(child) = uses.get(&next) else {
                continue;
            };
            let arity = arities.get(k).copied().unwrap_or(0) as u64;
            for (i, slot) in most.iter_mut().enumerate() {
                let here = u64::from(i == k).saturating_add(arity.saturating_mul(child[i]));
                *slot = (*slot).max(here);
            }
        }
        uses.insert(used, most);
    }

    let start = vec![0; budgets.len()];
    uses.remove(&start).unwrap_or_else(|| vec![0; start.len()])
}

/// Nonterminals of the `synth-fun` grammar, start symbol first, followed by
/// the `Const` (when a free constant exists) and `Var` leaves.
pub fn nonterminals(library: &Library, bit_width: u32) -> Vec<Nonterminal> {
    let sort = Term::bv_sort(library.tag_width + bit_width);
    let untagged = |leaf: Term| Term::concat(Term::atom(bits::zeros(library.tag_width)), leaf);

    let mut leaves = vec![untagged(Term::atom(VAR))];
    if let Some(width) = library.free_constant_width {
        leaves.push(free_constant(library.tag_width, width, bit_width));
    }
    for kind in &library.kinds {
        if let KindForm::FixedConstant { literal } = &kind.form {
            leaves.push(untagged(Term::atom(literal.as_str())));
        }
    }

    let budgets = library.budgets();
    let mut result: Vec<Nonterminal> = reachable_vectors(&budgets)
        .into_iter()
        .map(|used| {
            let mut productions = leaves.clone();
            for (i, kind) in library.kinds.iter().enumerate() {
                let KindForm::Operator { arity, .. } = kind.form else {
                    continue;
                };
                if used[i] < budgets[i] {
                    let mut next = used.clone();
                    next[i] += 1;
                    let child = nonterminal_name(&next);
                    productions.push(Term::call(
                        kind.wrapper_name(),
                        (0..arity).map(|_| Term::atom(child.as_str())),
                    ));
                }
            }

            let nonterminal = Nonterminal {
                name: nonterminal_name(&used),
                sort: sort.clone(),
                productions,
            };
            trace!("Nonterminal {}", nonterminal);
            nonterminal
        })
        .collect();

    if let Some(width) = library.free_constant_width {
        result.push(leaf(CONST, "Constant", width));
    }
    result.push(leaf(VAR, "Variable", bit_width));
    result
}

/// `Const` under a zero tag, resized to `bit_width`.
fn free_constant(tag_width: u32, width: u32, bit_width: u32) -> Term {
    let constant = Term::atom(CONST);
    match width.cmp(&bit_width) {
        Ordering::Less => Term::concat(
            Term::atom(bits::zeros(tag_width + bit_width - width)),
            constant,
        ),
        Ordering::Equal => Term::concat(Term::atom(bits::zeros(tag_width)), constant),
        Ordering::Greater => Term::concat(
            Term::atom(bits::zeros(tag_width)),
            Term::extract(bit_width - 1, 0, constant),
        ),
    }
}

/// `(Name (_ BitVec w) ((Class (_ BitVec w))))`
fn leaf(name: &str, class: &str, width: u32) -> Nonterminal {
    Nonterminal {
        name: name.to_string(),
        sort: Term::bv_sort(width),
        productions: vec![Term::list([Term::atom(class), Term::bv_sort(width)])],
    }
}
