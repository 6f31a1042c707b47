//! Dependency ordering for the rule table.
//!
//! Rule R depends on rule S when R's antecedent reads a flag that S's
//! consequent writes. Edges point from dependent to dependency, and the
//! evaluation order is dependency-first, so every writer of a flag runs
//! before any reader of it. Declaration order only breaks ties between
//! independent rules.
//!
//! # Example
//!
//! ```
//! use cppkeys_core::{Assignment, EvaluationPlan, Expr, FlagId, Rule, RuleTable};
//!
//! let flag = |s: &str| FlagId::new(s).unwrap();
//! let mut table = RuleTable::new();
//! // Declared reader-first on purpose
//! table
//!     .add_rule(Rule::new("oxygen", Expr::flag(flag("BIO_NChlPZD")), vec![Assignment::on(flag("OXYGEN"))]))
//!     .unwrap();
//! table
//!     .add_rule(Rule::new("model", Expr::flag(flag("BIOLOGY")), vec![Assignment::on(flag("BIO_NChlPZD"))]))
//!     .unwrap();
//!
//! let plan = EvaluationPlan::build(&table);
//! let order: Vec<&str> = plan.ordered_rules(&table).map(|r| r.id.as_str()).collect();
//! assert_eq!(order, vec!["model", "oxygen"]);
//! assert!(plan.cycles().is_empty());
//! ```

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::flag::FlagId;
use crate::rule::{Rule, RuleId, RuleTable};

/// Rules whose dependencies loop back on themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Participating rules in declaration order
    pub rules: Vec<RuleId>,
    /// Flags both read and written inside the cycle, sorted
    pub flags: Vec<FlagId>,
}

/// Precomputed evaluation order for a rule table.
#[derive(Debug, Clone, Default)]
pub struct EvaluationPlan {
    /// Rule indices in evaluation order
    order: Vec<usize>,
    /// Position in `order` of the last rule writing each flag
    last_writer: HashMap<FlagId, usize>,
    cycles: Vec<Cycle>,
}

impl EvaluationPlan {
    /// Order the rules of a table.
    ///
    /// Acyclic rules are sorted with Kahn's algorithm. Whatever Kahn cannot
    /// place sits in or behind a cycle; those rules are split into strongly
    /// connected components and appended dependency-first.
    pub fn build(table: &RuleTable) -> Self {
        let rules = table.rules();
        let n = rules.len();

        let mut writers: HashMap<&FlagId, Vec<usize>> = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            for flag in rule.writes() {
                let entry = writers.entry(flag).or_default();
                if !entry.contains(&i) {
                    entry.push(i);
                }
            }
        }

        // deps[r]: rules that r must run after
        let mut deps: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for (r, rule) in rules.iter().enumerate() {
            for flag in rule.when.flags() {
                if let Some(ws) = writers.get(flag) {
                    deps[r].extend(ws.iter().copied());
                }
            }
        }
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (r, ds) in deps.iter().enumerate() {
            for &d in ds {
                dependents[d].push(r);
            }
        }

        // Kahn's algorithm, smallest declaration index first
        let mut in_degree: Vec<usize> = deps.iter().map(|d| d.len()).collect();
        let mut ready: BTreeSet<usize> = (0..n).filter(|&r| in_degree[r] == 0).collect();
        let mut order = Vec::with_capacity(n);
        let mut placed = vec![false; n];

        while let Some(current) = ready.pop_first() {
            order.push(current);
            placed[current] = true;
            for &dependent in &dependents[current] {
                in_degree[dependent] = in_degree[dependent].saturating_sub(1);
                if in_degree[dependent] == 0 && !placed[dependent] {
                    ready.insert(dependent);
                }
            }
        }

        let mut cycles = Vec::new();
        if order.len() != n {
            let leftover: Vec<usize> = (0..n).filter(|&r| !placed[r]).collect();
            for component in strongly_connected(&leftover, &deps) {
                let is_cycle =
                    component.len() > 1 || deps[component[0]].contains(&component[0]);
                if is_cycle {
                    cycles.push(describe_cycle(rules, &component));
                }
                order.extend(component);
            }
        }

        let mut last_writer = HashMap::new();
        for (position, &r) in order.iter().enumerate() {
            for flag in rules[r].writes() {
                last_writer.insert(flag.clone(), position);
            }
        }

        if !cycles.is_empty() {
            tracing::debug!(cycles = cycles.len(), "Rule table contains dependency cycles");
        }

        Self {
            order,
            last_writer,
            cycles,
        }
    }

    /// Rule indices in evaluation order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Rules of `table` in evaluation order.
    pub fn ordered_rules<'a>(&'a self, table: &'a RuleTable) -> impl Iterator<Item = &'a Rule> {
        self.order.iter().map(|&i| &table.rules()[i])
    }

    /// Dependency cycles found in the table.
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Whether no rule at or after `position` can still write `flag`.
    ///
    /// A flag that nothing writes is settled everywhere.
    pub fn is_settled(&self, flag: &FlagId, position: usize) -> bool {
        match self.last_writer.get(flag) {
            Some(&last) => last < position,
            None => true,
        }
    }

    /// Whether any rule writes `flag`.
    pub fn is_written(&self, flag: &FlagId) -> bool {
        self.last_writer.contains_key(flag)
    }
}

fn describe_cycle(rules: &[Rule], component: &[usize]) -> Cycle {
    let mut reads: BTreeSet<&FlagId> = BTreeSet::new();
    let mut writes: BTreeSet<&FlagId> = BTreeSet::new();
    for &r in component {
        reads.extend(rules[r].when.flags());
        writes.extend(rules[r].writes());
    }
    Cycle {
        rules: component.iter().map(|&r| rules[r].id.clone()).collect(),
        flags: reads.intersection(&writes).map(|f| (*f).clone()).collect(),
    }
}

/// Tarjan's strongly connected components over the `nodes` subgraph.
///
/// Components come out dependency-first (each after everything it depends
/// on), members sorted by declaration index.
fn strongly_connected(nodes: &[usize], deps: &[BTreeSet<usize>]) -> Vec<Vec<usize>> {
    struct State<'a> {
        deps: &'a [BTreeSet<usize>],
        member: Vec<bool>,
        index: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next: usize,
        out: Vec<Vec<usize>>,
    }

    fn visit(s: &mut State<'_>, v: usize) {
        s.index[v] = Some(s.next);
        s.lowlink[v] = s.next;
        s.next += 1;
        s.stack.push(v);
        s.on_stack[v] = true;

        let deps = s.deps;
        for &w in deps[v].iter() {
            if !s.member[w] {
                continue;
            }
            match s.index[w] {
                None => {
                    visit(s, w);
                    s.lowlink[v] = s.lowlink[v].min(s.lowlink[w]);
                }
                Some(wi) if s.on_stack[w] => {
                    s.lowlink[v] = s.lowlink[v].min(wi);
                }
                Some(_) => {}
            }
        }

        if Some(s.lowlink[v]) == s.index[v] {
            let mut component = Vec::new();
            while let Some(w) = s.stack.pop() {
                s.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            component.sort_unstable();
            s.out.push(component);
        }
    }

    let n = deps.len();
    let mut member = vec![false; n];
    for &v in nodes {
        member[v] = true;
    }
    let mut state = State {
        deps,
        member,
        index: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next: 0,
        out: Vec::new(),
    };
    for &v in nodes {
        if state.index[v].is_none() {
            visit(&mut state, v);
        }
    }
    state.out
}
