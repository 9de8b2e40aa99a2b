//! Forward-chaining, cost-minimizing plan search.
//!
//! The search expands a tree rooted at the current facts. Each edge applies
//! one usable goal whose preconditions hold in the parent's simulated state;
//! a goal is removed from the candidate set below the edge that used it, so
//! the depth is bounded by the number of usable goals. Every node whose state
//! satisfies the objective becomes a leaf and is not expanded further. The
//! cheapest leaf wins; equal costs resolve to the leaf discovered first.
//!
//! Worst-case work is exponential in the number of usable goals. Goal sets
//! are small (tens) and re-planning happens every tick, so the search stays
//! simple and exhaustive.

use tracing::{debug, trace, warn};

use crate::condition::GoalCondition;
use crate::facts::FactBase;
use crate::plan::{Plan, PlanStep};
use crate::plannable::{GoalId, Plannable};

/// Stateless planner entry point.
pub struct Planner;

impl Planner {
    /// Returns the cheapest plan from `facts` to `objective` using goals
    /// from `usable`, or an empty plan if there is none.
    ///
    /// `usable` must already be filtered by admissibility. Its order is the
    /// tie-break order: callers that need determinism must supply goals in a
    /// fixed order (the runtime uses registration order).
    pub fn plan<P: Plannable + ?Sized>(
        usable: &[(GoalId, &P)],
        facts: &FactBase,
        objective: &GoalCondition,
    ) -> Plan {
        Self::search(usable, facts, objective).into_plan()
    }

    /// Like [`plan`](Self::plan), but keeps search statistics.
    pub fn search<P: Plannable + ?Sized>(
        usable: &[(GoalId, &P)],
        facts: &FactBase,
        objective: &GoalCondition,
    ) -> Search {
        let candidates: Vec<Candidate<'_>> = usable
            .iter()
            .filter_map(|(id, goal)| Candidate::sample(*id, *goal))
            .collect();

        let mut graph = Graph {
            candidates: &candidates,
            objective,
            nodes: vec![Node {
                parent: None,
                cost: 0.0,
                state: *facts,
                candidate: None,
            }],
            leaves: Vec::new(),
        };

        let remaining: Vec<usize> = (0..candidates.len()).collect();
        let found = graph.build(0, &remaining);

        let plan = match graph.cheapest_leaf() {
            Some(leaf) if found => graph.reconstruct(leaf),
            _ => Plan::empty(),
        };

        debug!(
            target: "goap::planner",
            usable = candidates.len(),
            nodes = graph.nodes.len(),
            leaves = graph.leaves.len(),
            steps = plan.len(),
            cost = plan.total_cost(),
            "search finished"
        );

        Search {
            leaf_costs: graph.leaves.iter().map(|&n| graph.nodes[n].cost).collect(),
            nodes: graph.nodes.len(),
            plan,
        }
    }
}

/// Outcome of [`Planner::search`].
#[derive(Clone, Debug)]
pub struct Search {
    plan: Plan,
    leaf_costs: Vec<f32>,
    nodes: usize,
}

impl Search {
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }

    /// Cumulative cost of every objective-satisfying leaf, in discovery order.
    pub fn leaf_costs(&self) -> &[f32] {
        &self.leaf_costs
    }

    /// Number of search nodes created, root included.
    pub fn nodes(&self) -> usize {
        self.nodes
    }
}

/// A goal as seen by one search: cost sampled once, conditions as masks.
struct Candidate<'a> {
    id: GoalId,
    name: &'a str,
    cost: f32,
    requires: FactBase,
    // preconditions ask for both values of one predicate
    contradictory: bool,
    effects: FactBase,
}

impl<'a> Candidate<'a> {
    /// `None` if the goal reports a cost that is negative or not finite.
    fn sample<P: Plannable + ?Sized>(id: GoalId, goal: &'a P) -> Option<Self> {
        let cost = goal.cost();
        if !cost.is_finite() || cost < 0.0 {
            warn!(
                target: "goap::planner",
                goal = goal.name(),
                cost,
                "invalid cost, goal left out of the search"
            );
            return None;
        }

        let mut requires = FactBase::new();
        let mut contradictory = false;
        for pre in goal.preconditions() {
            if requires.get(pre.predicate) == Some(!pre.required) {
                contradictory = true;
            }
            requires.set(pre.predicate, pre.required);
        }

        Some(Self {
            id,
            name: goal.name(),
            cost,
            requires,
            contradictory,
            effects: goal.effects().iter().map(|e| (e.predicate, e.value)).collect(),
        })
    }

    #[inline]
    fn applicable(&self, state: &FactBase) -> bool {
        !self.contradictory && state.contains_all(&self.requires)
    }
}

struct Node {
    parent: Option<usize>,
    cost: f32,
    state: FactBase,
    candidate: Option<usize>,
}

/// Search tree stored as an arena; dropped at the end of the call.
struct Graph<'c, 'a> {
    candidates: &'c [Candidate<'a>],
    objective: &'c GoalCondition,
    nodes: Vec<Node>,
    leaves: Vec<usize>,
}

impl Graph<'_, '_> {
    /// Expands `parent` with every applicable goal from `remaining`.
    ///
    /// Returns `true` if at least one leaf was found below `parent`.
    fn build(&mut self, parent: usize, remaining: &[usize]) -> bool {
        let candidates = self.candidates;
        let mut found = false;

        for &index in remaining {
            let candidate = &candidates[index];
            let (parent_state, parent_cost) = {
                let node = &self.nodes[parent];
                (node.state, node.cost)
            };

            if !candidate.applicable(&parent_state) {
                continue;
            }

            let mut state = parent_state;
            state.merge(&candidate.effects);

            let node = self.nodes.len();
            self.nodes.push(Node {
                parent: Some(parent),
                cost: parent_cost + candidate.cost,
                state,
                candidate: Some(index),
            });

            if self.objective.is_met_by(&state) {
                trace!(
                    target: "goap::planner",
                    goal = candidate.name,
                    cost = parent_cost + candidate.cost,
                    "leaf"
                );
                self.leaves.push(node);
                found = true;
            } else {
                let subset: Vec<usize> = remaining
                    .iter()
                    .copied()
                    .filter(|&other| other != index)
                    .collect();
                if self.build(node, &subset) {
                    found = true;
                }
            }
        }

        found
    }

    /// Minimum-cost leaf; the first one discovered wins ties.
    fn cheapest_leaf(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for &leaf in &self.leaves {
            match best {
                Some(current) if self.nodes[current].cost <= self.nodes[leaf].cost => {}
                _ => best = Some(leaf),
            }
        }
        best
    }

    /// Walks parent links from `leaf` to the root. The resulting stack has the
    /// first goal to execute on top.
    fn reconstruct(&self, leaf: usize) -> Plan {
        let mut stack = Vec::new();
        let mut cursor = Some(leaf);

        while let Some(index) = cursor {
            let node = &self.nodes[index];
            if let Some(c) = node.candidate {
                let candidate = &self.candidates[c];
                stack.push(PlanStep {
                    goal: candidate.id,
                    name: candidate.name.to_owned(),
                    cost: candidate.cost,
                });
            }
            cursor = node.parent;
        }

        Plan::from_stack(stack, self.nodes[leaf].cost)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::condition::{Effect, Precondition};
    use crate::descriptor::GoalDescriptor;
    use crate::predicate::Predicate::{self, *};

    // Abstract predicates used by the reference scenarios.
    const A: Predicate = Pulled;
    const B: Predicate = Fighting;
    const C: Predicate = ShouldSkin;

    fn goal(
        name: &str,
        cost: f32,
        pre: &[(Predicate, bool)],
        eff: &[(Predicate, bool)],
    ) -> GoalDescriptor {
        let mut builder = GoalDescriptor::builder(name).cost(cost);
        for &(p, v) in pre {
            builder = builder.requires(p, v);
        }
        for &(p, v) in eff {
            builder = builder.effect(p, v);
        }
        builder.build().unwrap()
    }

    fn usable(goals: &[GoalDescriptor]) -> Vec<(GoalId, &GoalDescriptor)> {
        goals.iter().enumerate().map(|(i, g)| (GoalId(i), g)).collect()
    }

    fn want_b() -> GoalCondition {
        GoalCondition::new().require(B, true)
    }

    /// Replays `plan` from `facts`, checking every step's preconditions
    /// against the simulated state, and returns the final state.
    fn replay(plan: &Plan, goals: &[GoalDescriptor], facts: FactBase) -> FactBase {
        let mut state = facts;
        for step in plan.iter() {
            let goal = &goals[step.goal.index()];
            for pre in goal.preconditions() {
                assert!(
                    pre.is_met_by(&state),
                    "{} not met before {}",
                    pre.description,
                    goal.name()
                );
            }
            state.apply(goal.effects());
        }
        state
    }

    fn grind_goals() -> Vec<GoalDescriptor> {
        vec![
            goal("follow-route", 20.0, &[(HasTarget, false)], &[(HasTarget, true)]),
            goal(
                "approach-target",
                8.0,
                &[(HasTarget, true), (WithinPullRange, false)],
                &[(WithinPullRange, true)],
            ),
            goal(
                "pull-target",
                7.0,
                &[(HasTarget, true), (WithinPullRange, true), (Pulled, false)],
                &[(Pulled, true)],
            ),
            goal(
                "combat",
                4.0,
                &[(Pulled, true)],
                &[(Fighting, true), (ProducedCorpse, true)],
            ),
            goal(
                "shortcut",
                100.0,
                &[(HasTarget, true)],
                &[(ProducedCorpse, true)],
            ),
        ]
    }

    #[test]
    fn scenario_chain_of_two() {
        let goals = vec![
            goal("g1", 1.0, &[(A, false)], &[(A, true)]),
            goal("g2", 2.0, &[(A, true)], &[(B, true)]),
        ];
        let facts = FactBase::new().with(A, false).with(B, false);

        let plan = Planner::plan(&usable(&goals), &facts, &want_b());

        assert_eq!(plan.names(), ["g1", "g2"]);
        assert_eq!(plan.total_cost(), 3.0);
    }

    #[test]
    fn scenario_shorter_route_when_precondition_already_holds() {
        let goals = vec![
            goal("g1", 1.0, &[(A, false)], &[(A, true)]),
            goal("g2", 2.0, &[(A, true)], &[(B, true)]),
        ];
        let facts = FactBase::new().with(A, true).with(B, false);

        let plan = Planner::plan(&usable(&goals), &facts, &want_b());

        assert_eq!(plan.names(), ["g2"]);
        assert_eq!(plan.total_cost(), 2.0);
    }

    #[test]
    fn scenario_unreachable_objective_is_empty() {
        let goals = vec![goal("g3", 5.0, &[], &[(C, true)])];
        let facts = FactBase::new().with(B, false);

        let search = Planner::search(&usable(&goals), &facts, &want_b());

        assert!(search.plan().is_empty());
        assert!(search.leaf_costs().is_empty());
        assert_eq!(search.nodes(), 2);
    }

    #[test]
    fn scenario_equal_costs_resolve_by_supplied_order() {
        let goals = vec![
            goal("g4", 3.0, &[], &[(B, true)]),
            goal("g5", 3.0, &[], &[(B, true)]),
        ];
        let facts = FactBase::new().with(B, false);

        let forward = Planner::plan(&usable(&goals), &facts, &want_b());
        assert_eq!(forward.names(), ["g4"]);

        let reversed: Vec<_> = vec![(GoalId(1), &goals[1]), (GoalId(0), &goals[0])];
        let backward = Planner::plan(&reversed, &facts, &want_b());
        assert_eq!(backward.names(), ["g5"]);
    }

    #[test]
    fn picks_cheapest_of_all_leaves() {
        let goals = grind_goals();
        let facts = FactBase::new()
            .with(HasTarget, false)
            .with(WithinPullRange, false)
            .with(Pulled, false);
        let objective = GoalCondition::new().require(ProducedCorpse, true);

        let search = Planner::search(&usable(&goals), &facts, &objective);
        let plan = search.plan();

        assert_eq!(
            plan.names(),
            ["follow-route", "approach-target", "pull-target", "combat"]
        );
        assert!(search.leaf_costs().len() > 1);
        for &cost in search.leaf_costs() {
            assert!(plan.total_cost() <= cost);
        }

        let end = replay(plan, &goals, facts);
        assert!(objective.is_met_by(&end));
    }

    #[test]
    fn total_cost_is_sum_of_steps() {
        let goals = grind_goals();
        let facts = FactBase::new()
            .with(HasTarget, true)
            .with(WithinPullRange, false)
            .with(Pulled, false);
        let objective = GoalCondition::new().require(Fighting, true);

        let plan = Planner::plan(&usable(&goals), &facts, &objective);

        let sum: f32 = plan.iter().map(|s| s.cost).sum();
        assert_eq!(plan.total_cost(), sum);
        for step in plan.iter() {
            assert_eq!(step.cost, goals[step.goal.index()].cost());
        }
    }

    #[test]
    fn same_inputs_same_plan() {
        let goals = grind_goals();
        let facts = FactBase::new()
            .with(HasTarget, false)
            .with(WithinPullRange, false)
            .with(Pulled, false);
        let objective = GoalCondition::new().require(ProducedCorpse, true);

        let first = Planner::plan(&usable(&goals), &facts, &objective);
        let second = Planner::plan(&usable(&goals), &facts, &objective);

        assert_eq!(first, second);
    }

    #[test]
    fn goal_never_repeats_within_a_plan() {
        // Reaching the objective would need `arm` twice: arm, fire, arm.
        let goals = vec![
            goal("arm", 1.0, &[(A, false)], &[(A, true)]),
            goal("fire", 1.0, &[(A, true)], &[(A, false), (B, true)]),
        ];
        let facts = FactBase::new().with(A, false).with(B, false);
        let objective = GoalCondition::new().require(A, true).require(B, true);

        let plan = Planner::plan(&usable(&goals), &facts, &objective);
        assert!(plan.is_empty());
    }

    #[test]
    fn absent_predicates_never_satisfy() {
        let goals = vec![goal("needs-a", 1.0, &[(A, false)], &[(B, true)])];

        let plan = Planner::plan(&usable(&goals), &FactBase::new(), &want_b());
        assert!(plan.is_empty());
    }

    #[test]
    fn contradictory_preconditions_are_never_applicable() {
        let goals = vec![goal("impossible", 1.0, &[(A, true), (A, false)], &[(B, true)])];
        let facts = FactBase::new().with(A, false);

        assert!(Planner::plan(&usable(&goals), &facts, &want_b()).is_empty());
    }

    #[test]
    fn caller_facts_are_untouched() {
        let goals = grind_goals();
        let facts = FactBase::new().with(HasTarget, false);
        let before = facts;

        let _ = Planner::plan(
            &usable(&goals),
            &facts,
            &GoalCondition::new().require(ProducedCorpse, true),
        );

        assert_eq!(facts, before);
    }

    #[test]
    fn goals_left_out_of_usable_set_never_appear() {
        let goals = grind_goals();
        let facts = FactBase::new()
            .with(HasTarget, true)
            .with(WithinPullRange, true)
            .with(Pulled, false);
        let objective = GoalCondition::new().require(ProducedCorpse, true);

        // drop "pull-target" as if it were inadmissible this cycle
        let filtered: Vec<_> = usable(&goals)
            .into_iter()
            .filter(|(_, g)| g.name() != "pull-target")
            .collect();
        let plan = Planner::plan(&filtered, &facts, &objective);

        assert_eq!(plan.names(), ["shortcut"]);
    }

    /// Cost that changes every time it is read.
    struct Drifting {
        pre: Vec<Precondition>,
        eff: Vec<Effect>,
        reads: Cell<u32>,
    }

    impl Plannable for Drifting {
        fn name(&self) -> &str {
            "drifting"
        }

        fn cost(&self) -> f32 {
            let reads = self.reads.get() + 1;
            self.reads.set(reads);
            reads as f32
        }

        fn preconditions(&self) -> &[Precondition] {
            &self.pre
        }

        fn effects(&self) -> &[Effect] {
            &self.eff
        }
    }

    #[test]
    fn cost_is_sampled_once_per_call() {
        let goal = Drifting {
            pre: vec![],
            eff: vec![Effect::new(B, true)],
            reads: Cell::new(0),
        };
        let usable = [(GoalId(0), &goal)];

        let plan = Planner::plan(&usable, &FactBase::new(), &want_b());
        assert_eq!(goal.reads.get(), 1);
        assert_eq!(plan.total_cost(), 1.0);

        let plan = Planner::plan(&usable, &FactBase::new(), &want_b());
        assert_eq!(plan.total_cost(), 2.0);
    }

    /// Fixed cost, straight to `B`.
    struct Priced {
        name: &'static str,
        cost: f32,
        eff: Vec<Effect>,
    }

    impl Priced {
        fn new(name: &'static str, cost: f32) -> Self {
            Self {
                name,
                cost,
                eff: vec![Effect::new(B, true)],
            }
        }
    }

    impl Plannable for Priced {
        fn name(&self) -> &str {
            self.name
        }

        fn cost(&self) -> f32 {
            self.cost
        }

        fn preconditions(&self) -> &[Precondition] {
            &[]
        }

        fn effects(&self) -> &[Effect] {
            &self.eff
        }
    }

    #[test]
    fn goals_reporting_invalid_costs_are_left_out() {
        let nan = Priced::new("nan", f32::NAN);
        let negative = Priced::new("negative", -1.0);
        let infinite = Priced::new("infinite", f32::INFINITY);
        let honest = Priced::new("honest", 4.0);
        let usable = [
            (GoalId(0), &nan),
            (GoalId(1), &negative),
            (GoalId(2), &infinite),
            (GoalId(3), &honest),
        ];

        for _ in 0..3 {
            let search = Planner::search(&usable, &FactBase::new(), &want_b());
            assert_eq!(search.leaf_costs(), [4.0]);
            let plan = search.into_plan();
            assert_eq!(plan.names(), ["honest"]);
            assert_eq!(plan.total_cost(), 4.0);
        }

        let only_broken = [(GoalId(0), &nan), (GoalId(1), &negative)];
        assert!(Planner::plan(&only_broken, &FactBase::new(), &want_b()).is_empty());
    }
}
